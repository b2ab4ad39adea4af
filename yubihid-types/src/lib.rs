//! Type definitions for yubihid

pub mod error;
pub mod key_info;
pub mod key_state;
pub mod status;

pub use error::{Error, Result};
pub use key_info::KeyInfo;
pub use key_state::KeyState;
pub use status::{DeviceStatus, FirmwareVersion};
