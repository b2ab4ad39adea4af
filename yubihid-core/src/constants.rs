//! Protocol constants

/// Yubico USB vendor identifier
pub const YUBICO_VENDOR_ID: u16 = 0x1050;

/// Primary HID usage pair of the OTP (keyboard) interface
///
/// Only this interface exposes the feature reports used for
/// challenge-response.
pub const OTP_USAGE_PAGE: u16 = 0x01;
pub const OTP_USAGE: u16 = 0x06;

/// Size of one HID feature report (without report id)
pub const REPORT_SIZE: usize = 8;

/// Payload bytes carried by one feature report
pub const REPORT_DATA_SIZE: usize = REPORT_SIZE - 1;

/// Offset of the status/control byte inside a report
pub const STATUS_OFFSET: usize = REPORT_DATA_SIZE;

/// Last byte of the report sent to abort a pending operation
pub const RESET_MARKER: u8 = 0xFF;

/// Slot payload size inside a command frame
pub const SLOT_DATA_SIZE: usize = 64;

/// Full command frame size: payload + slot + crc + 3 reserved bytes
pub const FRAME_SIZE: usize = SLOT_DATA_SIZE + 1 + 2 + 3;

/// Number of reports a frame is segmented into
pub const FRAME_PACKETS: usize = FRAME_SIZE / REPORT_DATA_SIZE;

/// HMAC-SHA1 challenge block size
pub const HMAC_CHALLENGE_SIZE: usize = 64;

/// HMAC-SHA1 digest size
pub const HMAC_RESPONSE_SIZE: usize = 20;

/// Serial number size in bytes
pub const SERIAL_SIZE: usize = 4;

/// Zero payload sent with a serial number request (two report widths)
pub const SERIAL_REQUEST_SIZE: usize = 2 * REPORT_SIZE;

/// Status report layout
pub mod status_offsets {
    pub const VERSION_MAJOR: usize = 0x01;
    pub const VERSION_MINOR: usize = 0x02;
    pub const VERSION_BUILD: usize = 0x03;
    pub const CONFIG_SEQUENCE: usize = 0x04;
    pub const TOUCH_LOW: usize = 0x05;
    pub const TOUCH_HIGH: usize = 0x06;

    /// Mask over `TOUCH_LOW` telling which slots hold a valid config
    pub const CONFIG_STATUS_MASK: u8 = 0x1F;
}

/// Polling budget
pub mod polling {
    /// Readiness checks before giving up on a write
    pub const READY_ATTEMPTS: usize = 20;

    /// Delay between readiness checks (ms)
    pub const READY_INTERVAL_MS: u64 = 50;

    /// Delay while the device is processing (ms)
    pub const BUSY_INTERVAL_MS: u64 = 50;

    /// Delay while the device waits for a touch (ms)
    pub const TOUCH_INTERVAL_MS: u64 = 300;
}
