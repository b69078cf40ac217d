//! Data-acquisition daemon.
//!
//! Joins the beacon multicast group, watches the configured GPIO line
//! for falling edges, and appends one synchronized capture row per edge
//! until interrupted.
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

#[cfg(target_os = "linux")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use edgemark::{GpioEdgeSource, NodeConfig, TimesyncNode};
    use tokio::sync::watch;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = NodeConfig::default();
    tracing::info!(
        group = %config.beacon.group,
        port = config.beacon.port,
        chip = %config.edge.chip.display(),
        line = config.edge.line,
        log = %config.log_path.display(),
        "starting edgemarkd"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    // Acquire the line before the node starts: a missing chip or busy
    // line is a startup failure, not a runtime one.
    let source = GpioEdgeSource::open(&config.edge)?;

    TimesyncNode::new(config).run(source, shutdown_rx).await?;
    tracing::info!("edgemarkd stopped");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("edgemarkd requires the Linux GPIO character device");
    std::process::exit(1);
}
