//! Error types for yubihid-core



/// Result type alias for yubihid-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Report is too short to carry a status byte
    #[error("Report too short: expected {expected} bytes, got {actual} bytes")]
    ReportTooShort {
        expected: usize,
        actual: usize,
    },

    /// Payload does not fit into a slot frame
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// Unknown slot identifier
    #[error("Unknown slot identifier: 0x{0:02X}")]
    UnknownSlot(u8),

    /// Slot number outside 1..=2
    #[error("Invalid challenge-response slot number: {0} (expected 1 or 2)")]
    InvalidSlotNumber(u8),

    /// Slot cannot be used for the requested operation
    #[error("Slot {slot} does not support {operation}")]
    UnsupportedSlot {
        slot: crate::slot::ConfigSlot,
        operation: &'static str,
    },

    /// Invalid session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// Session not opened
    #[error("Session not open - open the device first")]
    SessionNotOpen,
}

impl Error {
    /// Check if error is a caller-side precondition violation
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::PayloadTooLarge { .. }
                | Self::UnsupportedSlot { .. }
                | Self::InvalidSlotNumber(_)
        )
    }

    /// Check if error comes from misuse of the open/close lifecycle
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::SessionNotOpen
                | Self::InvalidSessionState(_)
        )
    }
}
