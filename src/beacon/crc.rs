//! CRC-16/CCITT checksum used by the beacon frame trailer.

/// CRC polynomial (x^16 + x^12 + x^5 + 1).
const POLY: u16 = 0x1021;

/// Compute CRC-16/CCITT over `data`: polynomial 0x1021, initial value
/// 0x0000, MSB-first. Each input byte is shifted into the high byte of
/// the running value before the polynomial division.
///
/// With a zero initial value this is the XMODEM variant, so
/// `crc16_ccitt(b"123456789") == 0x31C3`.
#[must_use]
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0x0000;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
