//! Status byte of incoming reports

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Flags in the last byte of every report read from the device
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u8 {
        /// Device is still busy receiving or processing a write
        const SLOT_WRITE = 0x80;
        /// A response chunk follows; low bits carry its sequence number
        const PENDING = 0x40;
        /// Device is waiting for a physical touch
        const TIMEOUT_WAIT = 0x20;
    }
}

impl StatusFlags {
    /// Mask over the chunk sequence number of a pending report
    pub const SEQUENCE_MASK: u8 = 0x1F;
}

/// Decoded status byte
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    pub fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn flags(self) -> StatusFlags {
        StatusFlags::from_bits_retain(self.0)
    }

    /// Device finished and has nothing more to say
    pub fn is_idle(self) -> bool {
        self.0 == 0
    }

    pub fn is_pending(self) -> bool {
        self.flags().contains(StatusFlags::PENDING)
    }

    pub fn is_write_busy(self) -> bool {
        self.flags().contains(StatusFlags::SLOT_WRITE)
    }

    pub fn is_waiting_for_touch(self) -> bool {
        self.flags().contains(StatusFlags::TIMEOUT_WAIT)
    }

    /// Chunk sequence number (modulo 32), meaningful only when pending
    pub fn sequence(self) -> u8 {
        self.0 & StatusFlags::SEQUENCE_MASK
    }
}

impl From<u8> for Status {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Status")
            .field("raw", &format!("0x{:02X}", self.0))
            .field("flags", &self.flags())
            .field("sequence", &self.sequence())
            .finish()
    }
}
