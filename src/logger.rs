//! Synchronized capture logging.
//!
//! Converts each edge event into a tick value in the shared clock frame
//! and appends it to the capture log. The log is append-only and
//! write-only during normal operation; nothing in the node reads it
//! back.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, mpsc};

use crate::anchor::{AnchorSnapshot, ClockAnchor};
use crate::edge::EdgeEvent;

/// Duration of one network tick in microseconds.
pub const TICK_MICROS: u64 = 5_000;

/// Tick value of an instant in the shared clock frame.
///
/// Elapsed time before the anchor instant counts as zero, so an edge
/// that races a concurrent anchor update can never rewind below the
/// anchor tick.
#[must_use]
pub fn synchronized_tick(anchor: &AnchorSnapshot, at: Instant) -> u64 {
    let elapsed = at.saturating_duration_since(anchor.received_at);
    #[allow(clippy::cast_possible_truncation)]
    let elapsed_ticks = (elapsed.as_micros() / u128::from(TICK_MICROS)) as u64;
    anchor.tick.saturating_add(elapsed_ticks)
}

/// Appends one `"<tick>,1"` row per capture to the log file.
///
/// The file is opened, appended, and closed on every write; the write
/// lock serializes the whole open-append-close span so concurrent
/// captures never interleave partial rows. Open and write failures are
/// absorbed with a warning: the row is skipped and future writes are
/// unaffected.
pub struct TimestampLogger {
    anchor: Arc<ClockAnchor>,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TimestampLogger {
    /// Create a logger appending to `path`.
    pub fn new(path: impl Into<PathBuf>, anchor: Arc<ClockAnchor>) -> Self {
        Self {
            anchor,
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Record one edge event: read the anchor atomically, compute the
    /// synchronized tick from the event's detection instant, append a
    /// row.
    pub async fn record(&self, event: EdgeEvent) {
        let anchor = self.anchor.read();
        let tick = synchronized_tick(&anchor, event.at);
        self.append(tick).await;
    }

    /// Consume events from `rx` until every sender has hung up,
    /// recording each in queue order.
    ///
    /// This is the single capture worker: it gives shutdown a join point
    /// instead of detached fire-and-forget writes.
    pub async fn drain(&self, mut rx: mpsc::Receiver<EdgeEvent>) {
        while let Some(event) = rx.recv().await {
            self.record(event).await;
        }
    }

    async fn append(&self, tick: u64) {
        let _guard = self.write_lock.lock().await;

        let mut file = match OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await
        {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "failed to open capture log, skipping row: {e}"
                );
                return;
            }
        };

        let row = format!("{tick},1\n");
        if let Err(e) = file.write_all(row.as_bytes()).await {
            tracing::warn!(
                path = %self.path.display(),
                "failed to append capture row, skipping: {e}"
            );
            return;
        }
        // `tokio::fs::File` buffers writes and completes them on a
        // background thread; flush before releasing the lock so the row
        // is on disk when `append` returns.
        if let Err(e) = file.flush().await {
            tracing::warn!(
                path = %self.path.display(),
                "failed to flush capture row, skipping: {e}"
            );
        }
        // File handle closes on drop; nothing is held across writes.
    }
}
