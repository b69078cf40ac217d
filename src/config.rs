//! Node configuration.
//!
//! Plain data with `Default` impls carrying the reference bench values
//! (a Raspberry Pi with the trigger wired to GPIO 17). There is no
//! config-file layer; callers override fields directly.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the beacon receiver.
#[derive(Debug, Clone)]
pub struct BeaconConfig {
    /// Multicast group the beacon master sends to.
    pub group: Ipv4Addr,
    /// UDP port of the beacon stream.
    pub port: u16,
    /// Local interface for the multicast membership.
    pub interface: Ipv4Addr,
    /// Receive buffer size. Must exceed the frame size so oversized
    /// datagrams are seen as oversized instead of silently truncated.
    pub recv_buf_size: usize,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            group: Ipv4Addr::new(224, 0, 0, 1),
            port: 12345,
            interface: Ipv4Addr::UNSPECIFIED,
            recv_buf_size: 64,
        }
    }
}

/// Configuration for the GPIO trigger line.
#[derive(Debug, Clone)]
pub struct EdgeConfig {
    /// GPIO character device path.
    pub chip: PathBuf,
    /// Line offset on the chip.
    pub line: u32,
    /// Consumer label the line is requested under.
    pub consumer: String,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            chip: PathBuf::from("/dev/gpiochip0"),
            line: 17,
            consumer: "edgemark".to_string(),
        }
    }
}

/// Top-level configuration for a [`TimesyncNode`](crate::TimesyncNode).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Beacon receiver settings.
    pub beacon: BeaconConfig,
    /// Trigger line settings.
    pub edge: EdgeConfig,
    /// Path of the append-only capture log.
    pub log_path: PathBuf,
    /// Capacity of the edge-event capture queue. Events arriving while
    /// the queue is full are dropped with a warning.
    pub queue_capacity: usize,
    /// How long shutdown waits for in-flight captures before abandoning
    /// them.
    pub shutdown_grace: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            beacon: BeaconConfig::default(),
            edge: EdgeConfig::default(),
            log_path: PathBuf::from("timestamps.csv"),
            queue_capacity: 64,
            shutdown_grace: Duration::from_millis(500),
        }
    }
}
