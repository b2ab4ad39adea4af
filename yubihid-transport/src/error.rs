//! Transport errors

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Device not open")]
    NotOpen,

    #[error("Device already open")]
    AlreadyOpen,

    #[cfg(feature = "hid")]
    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    #[error("Short feature report: expected {expected} bytes, got {actual}")]
    ShortReport {
        expected: usize,
        actual: usize,
    },

    #[error("Invalid device path: {0}")]
    InvalidPath(String),

    #[error("Background I/O task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Scripted device has no more reports")]
    ScriptExhausted,

    #[error("Injected failure: {0}")]
    Injected(String),
}
