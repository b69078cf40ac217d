//! Node wiring and lifecycle.
//!
//! Wires the beacon receiver, edge monitor, and capture worker together
//! and owns the shutdown sequence: the first loop to fail (or an
//! external shutdown signal) stops the others, and in-flight captures
//! get a bounded grace period before being abandoned.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::anchor::ClockAnchor;
use crate::beacon::BeaconReceiver;
use crate::config::NodeConfig;
use crate::edge::{EdgeMonitor, EdgeSource};
use crate::error::Result;
use crate::logger::TimestampLogger;

/// A complete data-acquisition node.
pub struct TimesyncNode {
    config: NodeConfig,
}

impl TimesyncNode {
    /// Create a node from its configuration.
    #[must_use]
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    /// Acquire resources and run until `shutdown` is signaled or a loop
    /// fails.
    ///
    /// Binds the beacon socket and joins the multicast group up front;
    /// either failing aborts startup. The caller supplies the edge
    /// source so the same wiring serves hardware and simulated lines.
    ///
    /// # Errors
    /// Returns the fatal error of whichever loop failed first, or
    /// [`NodeError::Socket`](crate::NodeError::Socket) if startup
    /// acquisition fails. External shutdown yields `Ok(())`.
    pub async fn run<S>(self, source: S, mut shutdown: watch::Receiver<bool>) -> Result<()>
    where
        S: EdgeSource + Send + 'static,
    {
        let anchor = Arc::new(ClockAnchor::new());
        let receiver = BeaconReceiver::bind(&self.config.beacon, Arc::clone(&anchor)).await?;
        let logger = Arc::new(TimestampLogger::new(&self.config.log_path, anchor));

        let (captures_tx, captures_rx) = mpsc::channel(self.config.queue_capacity);
        let monitor = EdgeMonitor::new(source, captures_tx);

        // Internal stop channel: fatal errors and the external signal
        // both funnel into it so every loop unwinds the same way.
        let (stop_tx, stop_rx) = watch::channel(false);

        let mut beacon_task = tokio::spawn({
            let stop = stop_rx.clone();
            async move { receiver.run(stop).await }
        });
        let mut edge_task = tokio::spawn(monitor.run(stop_rx));
        let mut capture_task = tokio::spawn({
            let logger = Arc::clone(&logger);
            async move { logger.drain(captures_rx).await }
        });

        let mut beacon_done = false;
        let mut edge_done = false;
        let outcome = tokio::select! {
            () = shutdown_requested(&mut shutdown) => {
                tracing::info!("shutdown requested");
                Ok(())
            }
            res = &mut beacon_task => {
                beacon_done = true;
                join_outcome(res, "beacon receiver")
            }
            res = &mut edge_task => {
                edge_done = true;
                join_outcome(res, "edge monitor")
            }
        };

        let _ = stop_tx.send(true);
        let grace = self.config.shutdown_grace;
        if !beacon_done {
            join_with_grace(&mut beacon_task, "beacon receiver", grace).await;
        }
        if !edge_done {
            join_with_grace(&mut edge_task, "edge monitor", grace).await;
        }
        drop(stop_tx);

        // The edge monitor is gone, so the capture queue's senders are
        // dropped and the worker drains whatever is left. Bounded wait:
        // abandoned captures are a known cost of terminating.
        match tokio::time::timeout(grace, &mut capture_task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("capture worker panicked: {e}"),
            Err(_) => {
                tracing::warn!("in-flight captures not finished within grace period, abandoning");
                capture_task.abort();
            }
        }

        outcome
    }
}

/// Resolve once the shutdown flag flips to `true` (or its sender is
/// dropped, which counts as a shutdown request).
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Interpret a finished loop task: loop results pass through, a panic
/// is surfaced as fatal.
fn join_outcome(
    res: std::result::Result<Result<()>, tokio::task::JoinError>,
    name: &str,
) -> Result<()> {
    match res {
        Ok(result) => {
            if let Err(ref e) = result {
                tracing::error!("{name} failed: {e}");
            }
            result
        }
        Err(e) => {
            tracing::error!("{name} task panicked: {e}");
            Err(crate::error::NodeError::Internal {
                message: format!("{name} task panicked: {e}"),
            })
        }
    }
}

/// Join a still-running loop task, aborting it if it overruns the grace
/// period.
async fn join_with_grace(task: &mut JoinHandle<Result<()>>, name: &str, grace: Duration) {
    match tokio::time::timeout(grace, &mut *task).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => tracing::warn!("{name} exited with error during shutdown: {e}"),
        Ok(Err(e)) => tracing::warn!("{name} task panicked: {e}"),
        Err(_) => {
            tracing::warn!("{name} did not stop within grace period, aborting");
            task.abort();
        }
    }
}
