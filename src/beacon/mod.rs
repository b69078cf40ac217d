//! Multicast clock beacon reception.
//!
//! The beacon master periodically multicasts a 12-byte frame carrying a
//! sequence number and a network tick count, protected by a CRC-16/CCITT
//! trailer. This module validates incoming frames and adopts each valid
//! one as the new synchronization anchor.

mod crc;
mod frame;
mod receiver;

pub use crc::crc16_ccitt;
pub use frame::{BeaconFrame, FrameError};
pub use receiver::BeaconReceiver;

#[cfg(test)]
mod tests;
