//! Beacon sender for bench setups without a real beacon master.
//!
//! Multicasts one frame per second with an incrementing sequence number
//! and a tick count derived from elapsed time since start.

use std::time::{Duration, Instant};

use edgemark::{BeaconConfig, BeaconFrame, TICK_MICROS};
use tokio::net::UdpSocket;
use tracing_subscriber::EnvFilter;

/// TTL of two hops is enough for a lab network segment.
const MULTICAST_TTL: u32 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BeaconConfig::default();
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.set_multicast_ttl_v4(MULTICAST_TTL)?;
    tracing::info!(group = %config.group, port = config.port, "sending beacons");

    let started = Instant::now();
    let mut sequence: u16 = 0;
    let mut timer = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = timer.tick() => {
                sequence = sequence.wrapping_add(1);
                #[allow(clippy::cast_possible_truncation)]
                let tick = (started.elapsed().as_micros() / u128::from(TICK_MICROS)) as u64;
                let frame = BeaconFrame { sequence, tick };
                socket.send_to(&frame.encode(), (config.group, config.port)).await?;
                tracing::info!(sequence, tick, "sent beacon");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, stopping");
                break;
            }
        }
    }
    Ok(())
}
