//! Beacon frame wire format.
//!
//! A frame is exactly 12 bytes:
//!
//! | offset | size | field          | encoding                  |
//! |--------|------|----------------|---------------------------|
//! | 0      | 2    | sequence       | u16, little-endian        |
//! | 2      | 8    | tick count     | u64, little-endian        |
//! | 10     | 2    | checksum       | u16, big-endian, CRC-16/CCITT over bytes 0..10 |

use bytes::{Buf, BufMut};
use thiserror::Error;

use super::crc::crc16_ccitt;

/// Frame validation errors.
///
/// Both variants mean the datagram carries no information; the receiver
/// drops it without touching any state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Datagram length was not exactly [`BeaconFrame::LEN`] bytes.
    #[error("invalid frame length: {0} bytes")]
    Length(usize),

    /// CRC trailer did not match the payload.
    #[error("checksum mismatch: computed {computed:#06x}, frame carries {received:#06x}")]
    Checksum {
        /// CRC computed over the payload
        computed: u16,
        /// CRC carried in the trailer
        received: u16,
    },
}

/// Decoded payload of a valid beacon frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconFrame {
    /// Sequence number assigned by the beacon master.
    pub sequence: u16,
    /// Network tick count (one tick = 5 ms).
    pub tick: u64,
}

impl BeaconFrame {
    /// Wire size of a frame in bytes.
    pub const LEN: usize = 12;

    /// Payload size covered by the CRC.
    const PAYLOAD_LEN: usize = 10;

    /// Decode and validate a datagram.
    ///
    /// # Errors
    /// Returns [`FrameError::Length`] unless the datagram is exactly 12
    /// bytes, and [`FrameError::Checksum`] if the CRC trailer does not
    /// match the first 10 bytes.
    pub fn decode(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() != Self::LEN {
            return Err(FrameError::Length(data.len()));
        }

        let computed = crc16_ccitt(&data[..Self::PAYLOAD_LEN]);
        let mut trailer = &data[Self::PAYLOAD_LEN..];
        let received = trailer.get_u16();
        if computed != received {
            return Err(FrameError::Checksum { computed, received });
        }

        let mut payload = &data[..Self::PAYLOAD_LEN];
        let sequence = payload.get_u16_le();
        let tick = payload.get_u64_le();
        Ok(Self { sequence, tick })
    }

    /// Encode this frame, computing the CRC trailer.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        {
            let mut payload = &mut buf[..Self::PAYLOAD_LEN];
            payload.put_u16_le(self.sequence);
            payload.put_u64_le(self.tick);
        }
        let crc = crc16_ccitt(&buf[..Self::PAYLOAD_LEN]);
        buf[Self::PAYLOAD_LEN..].copy_from_slice(&crc.to_be_bytes());
        buf
    }
}
