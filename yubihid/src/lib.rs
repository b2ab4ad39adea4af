//! # yubihid
//!
//! HMAC-SHA1 challenge-response with YubiKeys over the USB HID OTP interface.
//!
//! ## Features
//!
//! - Async/await API using Tokio
//! - Touch and busy progress reported through a callback
//! - Cancellation from any task
//! - Transport abstraction with a scripted device for tests
//!
//! ## Quick Start
//!
//! ```no_run
//! use yubihid::{ConfigSlot, YubiKey};
//!
//! #[tokio::main]
//! async fn main() -> yubihid::Result<()> {
//!     for mut key in YubiKey::list_connected()? {
//!         if !key.is_otp_enabled() {
//!             continue;
//!         }
//!
//!         key.open().await?;
//!         let slot = ConfigSlot::challenge(2)?;
//!         let response = key.perform_challenge_response(slot, b"hello", |_| {}).await?;
//!         println!("{}: {}", key.info(), hex::encode(response));
//!         key.close().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
mod protocol;

// Re-exports
pub use config::PollTiming;
pub use device::{CancelHandle, YubiKey};
pub use error::{Error, Result};
pub use protocol::Observer;

// Re-export types
pub use yubihid_core::{ConfigSlot, Session};
pub use yubihid_transport::{ScriptedTransport, Transport};
pub use yubihid_types::{DeviceStatus, FirmwareVersion, KeyInfo, KeyState};
