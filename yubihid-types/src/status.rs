//! Device status decoded from an idle report

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use yubihid_core::constants::{REPORT_SIZE, status_offsets};

use crate::error::{Error, Result};

/// Firmware version triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

/// Status block the device reports while idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    pub version: FirmwareVersion,

    /// Counter bumped on every successful slot (re)configuration
    pub config_sequence: u8,

    /// Touch level; the low bits of the first byte flag configured slots
    pub touch_level: u16,
}

impl DeviceStatus {
    /// Decode from an 8-byte feature report
    pub fn from_report(report: &[u8]) -> Result<Self> {
        if report.len() < REPORT_SIZE {
            return Err(Error::Parse(format!(
                "status report needs {} bytes, got {}",
                REPORT_SIZE,
                report.len()
            )));
        }

        Ok(Self {
            version: FirmwareVersion {
                major: report[status_offsets::VERSION_MAJOR],
                minor: report[status_offsets::VERSION_MINOR],
                build: report[status_offsets::VERSION_BUILD],
            },
            config_sequence: report[status_offsets::CONFIG_SEQUENCE],
            touch_level: LittleEndian::read_u16(
                &report[status_offsets::TOUCH_LOW..=status_offsets::TOUCH_HIGH],
            ),
        })
    }

    /// Slot configuration bits from the touch level
    pub fn config_status(&self) -> u8 {
        (self.touch_level as u8) & status_offsets::CONFIG_STATUS_MASK
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Status[FW: {}, config seq: {}, touch: 0x{:04X}]",
            self.version, self.config_sequence, self.touch_level
        )
    }
}
