//! # edgemark
//!
//! A data-acquisition node for single-board computers that stamps GPIO
//! trigger edges with a time value synchronized to a network-distributed
//! clock beacon.
//!
//! A beacon master multicasts small frames carrying a monotonically
//! increasing tick count (one tick = 5 ms). Each node anchors its local
//! monotonic clock to the most recently accepted beacon, and converts
//! every falling edge on its trigger line into a tick value in the shared
//! clock frame, appended to an on-disk capture log.
//!
//! ## Example
//!
//! ```rust,no_run
//! use edgemark::{NodeConfig, TimesyncNode};
//! use edgemark::testing::SimulatedEdgeSource;
//! use tokio::sync::watch;
//!
//! # async fn example() -> Result<(), edgemark::NodeError> {
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let (source, edges) = SimulatedEdgeSource::new(16);
//!
//! let node = TimesyncNode::new(NodeConfig::default());
//! tokio::spawn(async move {
//!     edges.trigger();
//!     let _ = shutdown_tx.send(true);
//! });
//! node.run(source, shutdown_rx).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! Three long-lived loops run concurrently for the process lifetime:
//!
//! - **Beacon receiver**: validates multicast frames and overwrites the
//!   shared [`ClockAnchor`]
//! - **Edge monitor**: waits on the GPIO line and queues capture events
//! - **Capture worker**: converts each event into a synchronized tick and
//!   appends it to the log
//!
//! The loops never block each other except through the anchor lock, which
//! is held only for the instant of a read or write.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Error types
pub mod error;
/// Node configuration
pub mod config;
/// Shared clock anchor
pub mod anchor;
/// Beacon frame codec and receiver
pub mod beacon;
/// GPIO edge detection
pub mod edge;
/// Synchronized capture logging
pub mod logger;
/// Node wiring and lifecycle
pub mod node;

/// Testing utilities
pub mod testing;

// Re-exports
pub use anchor::{AnchorSnapshot, ClockAnchor};
pub use beacon::{BeaconFrame, BeaconReceiver, FrameError, crc16_ccitt};
pub use config::{BeaconConfig, EdgeConfig, NodeConfig};
pub use edge::{EdgeEvent, EdgeMonitor, EdgeSource};
pub use error::{NodeError, Result};
pub use logger::{TICK_MICROS, TimestampLogger, synchronized_tick};
pub use node::TimesyncNode;

#[cfg(all(feature = "gpio", target_os = "linux"))]
pub use edge::GpioEdgeSource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
