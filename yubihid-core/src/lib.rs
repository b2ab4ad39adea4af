//! # yubihid-core
//!
//! Core protocol implementation for YubiKey HID challenge-response.
//!
//! This crate provides the low-level protocol primitives:
//! - ISO13239 CRC-16
//! - Command frame encoding and report segmentation
//! - Status byte decoding
//! - Slot identifiers and protocol constants
//! - Session state and cancellation flag

pub mod checksum;
pub mod constants;
pub mod error;
pub mod frame;
pub mod padding;
pub mod report;
pub mod session;
pub mod slot;
pub mod status;

pub use error::{Error, Result};
pub use frame::Frame;
pub use report::Report;
pub use session::{Session, SessionState};
pub use slot::ConfigSlot;
pub use status::{Status, StatusFlags};
