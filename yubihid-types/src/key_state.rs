//! Progress signal emitted while an operation waits on the device

use std::fmt;

/// What the device is doing while the caller waits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Device blinks and waits for a physical touch
    WaitingForTouch,

    /// Device is computing the response
    Processing,
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForTouch => f.write_str("waiting for touch"),
            Self::Processing => f.write_str("processing"),
        }
    }
}
