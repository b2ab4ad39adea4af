//! USB HID transport for YubiKey devices
//!
//! Exchanges 8-byte feature reports through hidapi. Report id 0 is
//! prepended on the wire and stripped again on receive. hidapi calls block,
//! so each one runs on the blocking thread pool.

use std::ffi::CString;
use std::sync::Arc;

use async_trait::async_trait;
use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};
use yubihid_core::{Report, constants::REPORT_SIZE, report};
use yubihid_types::KeyInfo;

use crate::{Transport, error::*, filter_keys};

/// Wire size of a feature report including the report id
const WIRE_REPORT_SIZE: usize = REPORT_SIZE + 1;

/// Enumerate connected Yubico HID interfaces
///
/// Every interface of the vendor is returned; check
/// [`KeyInfo::is_usable`] before running challenge-response on it.
pub fn list_connected_keys() -> Result<Vec<KeyInfo>> {
    let api = HidApi::new().map_err(|e| {
        debug!("Failed to enumerate HID devices: {}", e);
        Error::Hid(e)
    })?;

    let devices = api.device_list().map(|dev| {
        KeyInfo::new(
            dev.path().to_string_lossy(),
            dev.vendor_id(),
            dev.product_id(),
            dev.product_string().unwrap_or("?"),
            dev.usage_page(),
            dev.usage(),
        )
    });

    Ok(filter_keys(devices))
}

/// HID transport for one key interface
pub struct HidTransport {
    info: KeyInfo,
    device: Option<Arc<Mutex<HidDevice>>>,
}

impl HidTransport {
    /// Create new HID transport for a discovered interface
    pub fn new(info: KeyInfo) -> Self {
        Self { info, device: None }
    }

    /// Interface this transport talks to
    pub fn info(&self) -> &KeyInfo {
        &self.info
    }

    fn device(&self) -> Result<Arc<Mutex<HidDevice>>> {
        self.device.clone().ok_or(Error::NotOpen)
    }
}

#[async_trait]
impl Transport for HidTransport {
    async fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }

        let path = CString::new(self.info.path.clone())
            .map_err(|_| Error::InvalidPath(self.info.path.clone()))?;

        debug!("Opening {}...", self.info);

        let device = tokio::task::spawn_blocking(move || {
            let api = HidApi::new_without_enumerate()?;
            api.open_path(&path)
        })
        .await?
        .map_err(|e| {
            error!("Failed to open USB HID device: {}", e);
            Error::Hid(e)
        })?;

        debug!("USB HID device opened");

        self.device = Some(Arc::new(Mutex::new(device)));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.device.take().is_some() {
            debug!("USB HID device closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    async fn send_report(&mut self, report: &Report) -> Result<()> {
        let device = self.device()?;

        let mut buf = [0u8; WIRE_REPORT_SIZE];
        buf[1..].copy_from_slice(report);

        trace!("Sending report: {}", hex::encode(report));

        tokio::task::spawn_blocking(move || device.lock().send_feature_report(&buf))
            .await?
            .map_err(|e| {
                warn!("Failed to send to USB HID device: {}", e);
                Error::Hid(e)
            })
    }

    async fn receive_report(&mut self) -> Result<Report> {
        let device = self.device()?;

        let (buf, n) = tokio::task::spawn_blocking(move || {
            let mut buf = [0u8; WIRE_REPORT_SIZE];
            device.lock().get_feature_report(&mut buf).map(|n| (buf, n))
        })
        .await?
        .map_err(|e| {
            error!("Failed to receive from USB HID device: {}", e);
            Error::Hid(e)
        })?;

        if n < WIRE_REPORT_SIZE {
            return Err(Error::ShortReport {
                expected: WIRE_REPORT_SIZE,
                actual: n,
            });
        }

        let received = report::from_slice(&buf[1..]).map_err(|_| Error::ShortReport {
            expected: WIRE_REPORT_SIZE,
            actual: n,
        })?;

        trace!("Received report: {}", hex::encode(received));

        Ok(received)
    }

    fn description(&self) -> String {
        self.info.to_string()
    }
}

impl Drop for HidTransport {
    fn drop(&mut self) {
        if self.is_open() {
            warn!("HID transport dropped while still open");
        }
    }
}
