//! Configuration slot identifiers

use std::fmt;

use crate::error::{Error, Result};

/// Device configuration slot addressed by a command frame
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConfigSlot {
    /// Read-only area holding the device serial number
    DeviceSerial = 0x10,

    /// HMAC-SHA1 challenge-response, slot 1
    ChallengeHmac1 = 0x30,

    /// HMAC-SHA1 challenge-response, slot 2
    ChallengeHmac2 = 0x38,
}

impl ConfigSlot {
    /// Challenge-response slot for a user-facing slot number (1 or 2)
    ///
    /// # Examples
    ///
    /// ```
    /// use yubihid_core::ConfigSlot;
    ///
    /// assert_eq!(ConfigSlot::challenge(2).unwrap(), ConfigSlot::ChallengeHmac2);
    /// assert!(ConfigSlot::challenge(3).is_err());
    /// ```
    pub fn challenge(number: u8) -> Result<Self> {
        match number {
            1 => Ok(Self::ChallengeHmac1),
            2 => Ok(Self::ChallengeHmac2),
            _ => Err(Error::InvalidSlotNumber(number)),
        }
    }

    /// Check if this slot answers HMAC challenges
    pub fn is_challenge_response(self) -> bool {
        matches!(self, Self::ChallengeHmac1 | Self::ChallengeHmac2)
    }

    /// Get slot name
    pub fn name(self) -> &'static str {
        match self {
            Self::DeviceSerial => "SLOT_DEVICE_SERIAL",
            Self::ChallengeHmac1 => "SLOT_CHAL_HMAC1",
            Self::ChallengeHmac2 => "SLOT_CHAL_HMAC2",
        }
    }
}

impl From<ConfigSlot> for u8 {
    fn from(slot: ConfigSlot) -> u8 {
        slot as u8
    }
}

impl TryFrom<u8> for ConfigSlot {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x10 => Ok(Self::DeviceSerial),
            0x30 => Ok(Self::ChallengeHmac1),
            0x38 => Ok(Self::ChallengeHmac2),
            _ => Err(Error::UnknownSlot(value)),
        }
    }
}

impl fmt::Display for ConfigSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}
