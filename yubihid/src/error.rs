//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cancelled by the user.")]
    Cancelled,

    #[error("Failed to communicate with the YubiKey: {0}")]
    CommunicationFailure(String),

    #[error("Slot is not configured.")]
    SlotNotConfigured,

    #[error("Timeout waiting for YubiKey response.")]
    ResponseTimeout,

    #[error("Timeout waiting for YubiKey touch.")]
    TouchTimeout,

    #[error("Core protocol error: {0}")]
    Core(#[from] yubihid_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] yubihid_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] yubihid_types::Error),
}

impl Error {
    /// Check if the exchange with the device broke down
    ///
    /// Transport errors count as communication failures.
    pub fn is_communication_failure(&self) -> bool {
        matches!(
            self,
            Self::CommunicationFailure(_)
                | Self::Transport(_)
                | Self::Types(_)
        )
    }

    /// Check if the caller cancelled the operation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if the caller misused the API (bad slot, oversized data,
    /// open/close out of order)
    pub fn is_usage_error(&self) -> bool {
        match self {
            Self::Core(e) => e.is_precondition() || e.is_lifecycle(),
            _ => false,
        }
    }
}
