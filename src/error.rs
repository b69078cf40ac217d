use std::io;
use thiserror::Error;

/// Errors that can occur while running a timesync node.
///
/// Only conditions that make further correct operation impossible are
/// surfaced here (socket and hardware failures). Per-datagram and
/// per-event validation failures are absorbed where they occur and never
/// become process-level errors.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Socket setup, multicast membership, or receive failure.
    #[error("beacon socket error: {0}")]
    Socket(#[from] io::Error),

    /// GPIO chip, line, or event stream failure.
    #[error("GPIO error: {message}")]
    Gpio {
        /// Description of the failure
        message: String,
    },

    /// The edge source reported end-of-stream.
    #[error("edge source closed")]
    EdgeSourceClosed,

    /// The capture worker hung up while the edge monitor was still running.
    #[error("capture pipeline closed unexpectedly")]
    CapturePipelineClosed,

    /// A long-lived loop task failed abnormally.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure
        message: String,
    },
}

impl NodeError {
    /// Build a [`NodeError::Gpio`] from any displayable error.
    pub fn gpio(err: impl std::fmt::Display) -> Self {
        Self::Gpio {
            message: err.to_string(),
        }
    }
}

/// Result type alias for node operations
pub type Result<T> = std::result::Result<T, NodeError>;
