//! Testing utilities.
//!
//! Hardware-free stand-ins for the node's external interfaces, used by
//! the crate's own tests and usable by downstream bench setups.

use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::edge::{EdgeEvent, EdgeSource};
use crate::error::{NodeError, Result};

/// An [`EdgeSource`] driven by test code instead of hardware.
///
/// Created together with a [`SimulatedEdgeHandle`]; each `trigger` call
/// on the handle produces one edge. Dropping the handle ends the stream,
/// which the monitor treats as a fatal source failure, exactly like a
/// GPIO read error.
pub struct SimulatedEdgeSource {
    rx: mpsc::Receiver<EdgeEvent>,
}

/// Injects edges into a [`SimulatedEdgeSource`].
#[derive(Clone)]
pub struct SimulatedEdgeHandle {
    tx: mpsc::Sender<EdgeEvent>,
}

impl SimulatedEdgeSource {
    /// Create a source that buffers up to `capacity` pending edges.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, SimulatedEdgeHandle) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { rx }, SimulatedEdgeHandle { tx })
    }
}

impl SimulatedEdgeHandle {
    /// Inject an edge stamped with the current instant.
    ///
    /// Returns `false` if the source's buffer is full or the source was
    /// dropped.
    pub fn trigger(&self) -> bool {
        self.trigger_at(Instant::now())
    }

    /// Inject an edge with an explicit detection instant.
    ///
    /// Lets tests pin the elapsed time against a known anchor instant and
    /// assert exact tick values.
    pub fn trigger_at(&self, at: Instant) -> bool {
        self.tx.try_send(EdgeEvent { at }).is_ok()
    }
}

#[async_trait]
impl EdgeSource for SimulatedEdgeSource {
    async fn next_edge(&mut self) -> Result<EdgeEvent> {
        self.rx.recv().await.ok_or(NodeError::EdgeSourceClosed)
    }
}
