//! Linux GPIO character-device edge source.

use std::time::Instant;

use async_trait::async_trait;
use futures::StreamExt;
use gpio_cdev::{AsyncLineEventHandle, Chip, EventRequestFlags, EventType, LineRequestFlags};

use super::{EdgeEvent, EdgeSource};
use crate::config::EdgeConfig;
use crate::error::{NodeError, Result};

/// Falling-edge events from one line of a GPIO chip.
///
/// The line is requested at open time under the configured consumer
/// label and released when the source is dropped.
pub struct GpioEdgeSource {
    events: AsyncLineEventHandle,
}

impl GpioEdgeSource {
    /// Open the chip and request falling-edge events on the configured
    /// line.
    ///
    /// # Errors
    /// Returns [`NodeError::Gpio`] if the chip, line, or event request
    /// fails; all three abort startup.
    pub fn open(config: &EdgeConfig) -> Result<Self> {
        let mut chip = Chip::new(&config.chip).map_err(NodeError::gpio)?;
        let line = chip.get_line(config.line).map_err(NodeError::gpio)?;
        let handle = line
            .events(
                LineRequestFlags::INPUT,
                EventRequestFlags::FALLING_EDGE,
                &config.consumer,
            )
            .map_err(NodeError::gpio)?;
        let events = AsyncLineEventHandle::new(handle).map_err(NodeError::gpio)?;

        tracing::info!(
            chip = %config.chip.display(),
            line = config.line,
            "watching GPIO line for falling edges"
        );
        Ok(Self { events })
    }
}

#[async_trait]
impl EdgeSource for GpioEdgeSource {
    async fn next_edge(&mut self) -> Result<EdgeEvent> {
        loop {
            match self.events.next().await {
                Some(Ok(event)) => {
                    // The request filters for falling edges, but the
                    // kernel still reports the type; skip anything else.
                    if event.event_type() == EventType::FallingEdge {
                        return Ok(EdgeEvent { at: Instant::now() });
                    }
                }
                Some(Err(e)) => return Err(NodeError::gpio(e)),
                None => return Err(NodeError::EdgeSourceClosed),
            }
        }
    }
}
