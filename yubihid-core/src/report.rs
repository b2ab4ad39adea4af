//! Fixed-size HID feature reports
//!
//! ```text
//! ┌──────────────────────────────┬──────────────┐
//! │            Data              │   Control    │
//! │           7 bytes            │    1 byte    │
//! └──────────────────────────────┴──────────────┘
//! ```
//!
//! Outgoing reports carry `0x80 | sequence` in the control byte, incoming
//! reports carry a [`Status`] byte there.

use crate::{
    constants::{REPORT_DATA_SIZE, REPORT_SIZE, RESET_MARKER, STATUS_OFFSET},
    error::{Error, Result},
    status::Status,
};

/// One feature report as exchanged with the device
pub type Report = [u8; REPORT_SIZE];

/// Build a report from a data chunk and a control byte
///
/// Chunks shorter than 7 bytes are zero padded.
pub fn new(data: &[u8], control: u8) -> Report {
    let mut report = [0u8; REPORT_SIZE];
    let len = data.len().min(REPORT_DATA_SIZE);
    report[..len].copy_from_slice(&data[..len]);
    report[STATUS_OFFSET] = control;
    report
}

/// Report that aborts whatever the device is doing
pub fn reset() -> Report {
    new(&[], RESET_MARKER)
}

/// Copy a received buffer into a report
pub fn from_slice(buf: &[u8]) -> Result<Report> {
    if buf.len() < REPORT_SIZE {
        return Err(Error::ReportTooShort {
            expected: REPORT_SIZE,
            actual: buf.len(),
        });
    }

    let mut report = [0u8; REPORT_SIZE];
    report.copy_from_slice(&buf[..REPORT_SIZE]);
    Ok(report)
}

/// Status byte of a received report
pub fn status(report: &Report) -> Status {
    Status::new(report[STATUS_OFFSET])
}

/// Data part of a report
pub fn data(report: &Report) -> &[u8] {
    &report[..REPORT_DATA_SIZE]
}

/// Check if the data part holds nothing but zeros
pub fn is_blank(report: &Report) -> bool {
    data(report).iter().all(|&b| b == 0)
}
