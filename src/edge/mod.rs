//! GPIO falling-edge detection.
//!
//! [`EdgeSource`] is the seam between the monitor loop and the hardware:
//! the production implementation wraps the Linux GPIO character device,
//! tests use [`SimulatedEdgeSource`](crate::testing::SimulatedEdgeSource).

use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::watch;

use crate::error::{NodeError, Result};

#[cfg(all(feature = "gpio", target_os = "linux"))]
mod gpio;
#[cfg(all(feature = "gpio", target_os = "linux"))]
pub use gpio::GpioEdgeSource;

#[cfg(test)]
mod tests;

/// A detected trigger transition.
///
/// Not a durable entity: it exists only long enough to produce one
/// capture-log row. The instant is taken at detection time so queueing
/// delay in the capture pipeline does not skew the recorded tick.
#[derive(Debug, Clone, Copy)]
pub struct EdgeEvent {
    /// Local monotonic instant the edge was detected.
    pub at: Instant,
}

impl EdgeEvent {
    /// An event stamped with the current instant.
    #[must_use]
    pub fn now() -> Self {
        Self { at: Instant::now() }
    }
}

/// Source of trigger edges.
///
/// `next_edge` blocks indefinitely until the next falling edge. Errors
/// and end-of-stream are fatal: the monitor loop unwinds into the node
/// shutdown path.
#[async_trait]
pub trait EdgeSource: Send {
    /// Wait for the next falling edge.
    ///
    /// # Errors
    /// Any error means the source is unusable; there is no retry.
    async fn next_edge(&mut self) -> Result<EdgeEvent>;
}

/// Watches the trigger line and queues a capture for every edge.
///
/// The monitor never does the capture work itself, so it can detect the
/// next edge while previous captures are still being written. Dispatch is
/// a bounded `try_send`: when captures fall behind, the newest events are
/// dropped with a warning rather than piling up without bound.
pub struct EdgeMonitor<S> {
    source: S,
    captures: mpsc::Sender<EdgeEvent>,
}

impl<S: EdgeSource> EdgeMonitor<S> {
    /// Create a monitor feeding the given capture queue.
    pub fn new(source: S, captures: mpsc::Sender<EdgeEvent>) -> Self {
        Self { source, captures }
    }

    /// Run the wait loop until shutdown is signaled or the source fails.
    ///
    /// # Errors
    /// Propagates the source's fatal error, or
    /// [`NodeError::CapturePipelineClosed`] if the capture worker hung up.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        loop {
            tokio::select! {
                event = self.source.next_edge() => {
                    match event {
                        Ok(event) => self.dispatch(event)?,
                        Err(e) => {
                            tracing::error!("edge wait failed: {e}");
                            return Err(e);
                        }
                    }
                }
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn dispatch(&self, event: EdgeEvent) -> Result<()> {
        match self.captures.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!("capture queue full, dropping edge event");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(NodeError::CapturePipelineClosed),
        }
    }
}
