//! Transport layer for the YubiKey HID protocol
//!
//! Provides feature-report exchange with devices, either over the host HID
//! stack or against a scripted simulated device.

pub mod error;
#[cfg(feature = "hid")]
pub mod hid;
pub mod scripted;

pub use error::{Error, Result};
#[cfg(feature = "hid")]
pub use hid::HidTransport;
pub use scripted::ScriptedTransport;

use async_trait::async_trait;
use tracing::debug;
use yubihid_core::{Report, constants::YUBICO_VENDOR_ID};
use yubihid_types::KeyInfo;

/// Transport trait for different report channels
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the device handle
    async fn open(&mut self) -> Result<()>;

    /// Close the device handle
    async fn close(&mut self) -> Result<()>;

    /// Check if open
    fn is_open(&self) -> bool;

    /// Send one feature report
    async fn send_report(&mut self, report: &Report) -> Result<()>;

    /// Receive one feature report
    async fn receive_report(&mut self) -> Result<Report>;

    /// Human readable device description
    fn description(&self) -> String;
}

/// Keep the Yubico interfaces among enumerated HID devices
///
/// Interfaces in another mode than OTP are kept too, flagged unusable.
pub fn filter_keys(devices: impl IntoIterator<Item = KeyInfo>) -> Vec<KeyInfo> {
    devices
        .into_iter()
        .filter(|info| info.vendor_id == YUBICO_VENDOR_ID)
        .inspect(|info| debug!("Found {}", info))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keys_keeps_all_yubico_interfaces() {
        let devices = vec![
            KeyInfo::new("a", 0x1050, 0x0407, "YubiKey OTP+FIDO+CCID", 0x01, 0x06),
            KeyInfo::new("b", 0x1050, 0x0407, "YubiKey OTP+FIDO+CCID", 0xF1D0, 0x01),
            KeyInfo::new("c", 0x046D, 0xC52B, "USB Receiver", 0x01, 0x06),
        ];

        let keys = filter_keys(devices);

        assert_eq!(keys.len(), 2);
        assert!(keys[0].is_usable());
        assert!(!keys[1].is_usable());
    }
}
