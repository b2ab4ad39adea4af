//! Discovered key interface

use std::fmt;

use yubihid_core::constants::{OTP_USAGE, OTP_USAGE_PAGE};

/// One HID interface of a connected key
///
/// A physical key shows up once per interface mode; only the OTP (keyboard)
/// interface speaks the challenge-response reports. Other interfaces are
/// still listed so callers can show them as unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Platform path used to open the interface
    pub path: String,

    /// USB vendor identifier
    pub vendor_id: u16,

    /// USB product identifier
    pub product_id: u16,

    /// Product name reported by the device
    pub product_name: String,

    /// Primary HID usage page
    pub usage_page: u16,

    /// Primary HID usage
    pub usage: u16,

    /// Interface speaks the OTP reports
    pub otp_enabled: bool,
}

impl KeyInfo {
    pub fn new(
        path: impl Into<String>,
        vendor_id: u16,
        product_id: u16,
        product_name: impl Into<String>,
        usage_page: u16,
        usage: u16,
    ) -> Self {
        Self {
            path: path.into(),
            vendor_id,
            product_id,
            product_name: product_name.into(),
            usage_page,
            usage,
            otp_enabled: usage_page == OTP_USAGE_PAGE && usage == OTP_USAGE,
        }
    }

    /// Check if challenge-response can run over this interface
    pub fn is_usable(&self) -> bool {
        self.otp_enabled
    }
}

impl fmt::Display for KeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [PID: {:04x}, HID usage: ({:X}, {:X})]",
            self.product_name, self.product_id, self.usage_page, self.usage
        )
    }
}
