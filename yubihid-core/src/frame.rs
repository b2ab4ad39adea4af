//! Command frame structure and segmentation into feature reports

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    constants::{FRAME_PACKETS, FRAME_SIZE, REPORT_DATA_SIZE, SLOT_DATA_SIZE},
    error::Result,
    padding,
    report::{self, Report},
    slot::ConfigSlot,
};

/// Control bit set on every outgoing report
pub const WRITE_FLAG: u8 = 0x80;

/// YubiKey command frame
///
/// # Frame Structure
///
/// ```text
/// ┌──────────────────┬──────────┬─────────────┬─────────────┐
/// │     Payload      │   Slot   │    CRC16    │  Reserved   │
/// │    64 bytes      │  1 byte  │   2 bytes   │   3 bytes   │
/// │  (zero padded)   │          │  (LE u16)   │   (zeros)   │
/// └──────────────────┴──────────┴─────────────┴─────────────┘
/// ```
///
/// The CRC covers the 64 payload bytes. The frame travels as ten 7-byte
/// chunks, each in its own feature report.
///
/// # Examples
///
/// ```
/// use yubihid_core::{ConfigSlot, Frame};
///
/// let frame = Frame::build(ConfigSlot::DeviceSerial, &[0; 16]).unwrap();
/// assert_eq!(frame.as_bytes().len(), 70);
///
/// let reports = frame.segment();
/// assert_eq!(reports.len(), 10);
/// assert_eq!(reports[9][7], 0x89);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    slot: ConfigSlot,
    bytes: Bytes,
}

impl Frame {
    /// Build a frame for `slot`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PayloadTooLarge`] if `payload` exceeds 64 bytes.
    pub fn build(slot: ConfigSlot, payload: &[u8]) -> Result<Self> {
        let padded = padding::zeros(payload, SLOT_DATA_SIZE)?;
        let crc = checksum::crc16(&padded);

        let mut buf = BytesMut::with_capacity(FRAME_SIZE);
        buf.put_slice(&padded);
        buf.put_u8(slot.into());
        buf.put_u16_le(crc);
        buf.put_bytes(0, 3);

        Ok(Self {
            slot,
            bytes: buf.freeze(),
        })
    }

    /// Target slot
    pub fn slot(&self) -> ConfigSlot {
        self.slot
    }

    /// Full 70 frame bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Zero padded slot payload
    pub fn payload(&self) -> &[u8] {
        &self.bytes[..SLOT_DATA_SIZE]
    }

    /// CRC stored in the frame
    pub fn crc(&self) -> u16 {
        u16::from_le_bytes([self.bytes[SLOT_DATA_SIZE + 1], self.bytes[SLOT_DATA_SIZE + 2]])
    }

    /// Split the frame into outgoing reports
    ///
    /// Report `i` carries chunk `i` and control byte `0x80 | i`.
    pub fn segment(&self) -> [Report; FRAME_PACKETS] {
        let mut reports = [[0u8; crate::constants::REPORT_SIZE]; FRAME_PACKETS];

        for (index, chunk) in self.bytes.chunks(REPORT_DATA_SIZE).enumerate() {
            reports[index] = report::new(chunk, WRITE_FLAG | index as u8);
        }

        reports
    }
}

/// Concatenate the data of chunk-bearing reports in arrival order
///
/// Reports flagged pending (read path) or slot-write (write path) contribute
/// their 7 data bytes; idle and busy reports are skipped.
pub fn reassemble<'a>(reports: impl IntoIterator<Item = &'a Report>) -> Bytes {
    let mut buf = BytesMut::new();

    for r in reports {
        let status = report::status(r);
        if status.is_pending() || status.is_write_busy() {
            buf.put_slice(report::data(r));
        }
    }

    buf.freeze()
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("slot", &self.slot)
            .field("crc", &format!("0x{:04X}", self.crc()))
            .field("payload", &hex::encode(self.payload()))
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame[{}](crc=0x{:04X})", self.slot, self.crc())
    }
}
