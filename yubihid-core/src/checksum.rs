//! ISO13239 CRC-16 used by the YubiKey HID protocol
//!
//! The same function protects outgoing frames and validates incoming
//! responses:
//! 1. Start from 0xFFFF
//! 2. XOR each byte into the low byte of the register
//! 3. Shift right 8 times, XOR-ing 0x8408 whenever a 1 bit falls out
//!
//! The device appends the ones-complement of the register to its responses,
//! so a response that arrived intact always leaves the fixed residue 0xF0B8.

use tracing::trace;

/// Register value before the first byte
pub const INITIAL: u16 = 0xFFFF;

/// Reflected form of the CCITT polynomial
pub const POLYNOMIAL: u16 = 0x8408;

/// Residue left by data followed by its own frame check sequence
pub const VALID_RESIDUE: u16 = 0xF0B8;

/// Calculate the ISO13239 CRC-16 of `data`
///
/// # Examples
///
/// ```
/// use yubihid_core::checksum;
///
/// assert_eq!(checksum::crc16(&[]), 0xFFFF);
/// assert_eq!(checksum::crc16(b"123456789"), 0x6F91);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = INITIAL;

    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            let low_bit = crc & 1;
            crc >>= 1;
            if low_bit != 0 {
                crc ^= POLYNOMIAL;
            }
        }
    }

    crc
}

/// Check that `data` ends with a valid frame check sequence
pub fn verify_residue(data: &[u8]) -> bool {
    let residue = crc16(data);

    trace!(
        len = data.len(),
        residue = format!("0x{:04X}", residue),
        "Checked CRC residue"
    );

    residue == VALID_RESIDUE
}

/// Frame check sequence the device appends after `data`
///
/// Little-endian ones-complement of the CRC. Appending these two bytes to
/// `data` makes [`verify_residue`] succeed.
pub fn frame_check_sequence(data: &[u8]) -> [u8; 2] {
    (!crc16(data)).to_le_bytes()
}
