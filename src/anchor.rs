//! Shared clock anchor linking network ticks to the local monotonic clock.

use std::sync::Mutex;
use std::time::Instant;

/// The most recently accepted beacon, as a single coherent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSnapshot {
    /// Sequence number carried by the beacon. Monotonically increasing on
    /// the network side, but not validated here.
    pub sequence: u16,
    /// Network tick count carried by the beacon.
    pub tick: u64,
    /// Local monotonic instant at which the beacon was received.
    pub received_at: Instant,
}

/// Mutex-guarded register holding the current synchronization anchor.
///
/// A pure synchronized register: no validation logic lives here. The
/// three snapshot fields always move together, so a reader never observes
/// a tick paired with a stale receipt instant. The lock is held only for
/// the instant of a read or write.
#[derive(Debug)]
pub struct ClockAnchor {
    inner: Mutex<AnchorSnapshot>,
}

impl ClockAnchor {
    /// Create an anchor in its initial state: sequence 0, tick 0, and the
    /// construction instant as the receipt time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(AnchorSnapshot {
                sequence: 0,
                tick: 0,
                received_at: Instant::now(),
            }),
        }
    }

    /// Read the current anchor atomically.
    #[must_use]
    pub fn read(&self) -> AnchorSnapshot {
        *self.lock()
    }

    /// Replace the anchor atomically.
    pub fn update(&self, sequence: u16, tick: u64, received_at: Instant) {
        *self.lock() = AnchorSnapshot {
            sequence,
            tick,
            received_at,
        };
    }

    /// The snapshot is `Copy` plain data and replaced wholesale, so a
    /// poisoned guard still holds a coherent value; recover it.
    fn lock(&self) -> std::sync::MutexGuard<'_, AnchorSnapshot> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for ClockAnchor {
    fn default() -> Self {
        Self::new()
    }
}
