//! High-level device interface

use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, info, warn};

use yubihid_core::{
    ConfigSlot, Frame, Session,
    constants::{HMAC_CHALLENGE_SIZE, HMAC_RESPONSE_SIZE, SERIAL_REQUEST_SIZE, SERIAL_SIZE},
    padding,
};
use yubihid_transport::Transport;
use yubihid_types::{DeviceStatus, KeyInfo, KeyState};

use crate::config::PollTiming;
use crate::error::Result;
use crate::protocol::{Exchange, validate_response};

/// YubiKey reachable over its OTP HID interface
///
/// # Examples
///
/// ```no_run
/// use yubihid::{ConfigSlot, YubiKey};
///
/// #[tokio::main]
/// async fn main() -> yubihid::Result<()> {
///     let mut keys = YubiKey::list_connected()?;
///     let key = keys.first_mut().expect("no YubiKey plugged in");
///
///     key.open().await?;
///     println!("Serial: {}", key.read_serial_number().await?);
///
///     let response = key
///         .perform_challenge_response(ConfigSlot::ChallengeHmac2, b"challenge", |state| {
///             println!("{}", state);
///         })
///         .await?;
///     println!("Response: {}", hex::encode(response));
///
///     key.close().await?;
///     Ok(())
/// }
/// ```
pub struct YubiKey {
    info: KeyInfo,
    transport: Box<dyn Transport>,
    session: Session,
    timing: PollTiming,
}

/// Cancels the operation running on a [`YubiKey`] from elsewhere
#[derive(Debug, Clone)]
pub struct CancelHandle {
    session: Session,
}

impl CancelHandle {
    /// Request cancellation; ignored while the key is closed
    pub fn cancel(&self) {
        self.session.cancel();
    }
}

impl YubiKey {
    /// Wrap a discovered interface and the transport reaching it
    pub fn new(info: KeyInfo, transport: impl Transport + 'static) -> Self {
        Self {
            info,
            transport: Box::new(transport),
            session: Session::new(),
            timing: PollTiming::default(),
        }
    }

    /// Enumerate Yubico interfaces attached to the host
    #[cfg(feature = "hid")]
    pub fn list_connected() -> Result<Vec<Self>> {
        use yubihid_transport::{HidTransport, hid::list_connected_keys};

        let keys = list_connected_keys()?
            .into_iter()
            .map(|info| Self::new(info.clone(), HidTransport::new(info)))
            .collect::<Vec<_>>();

        debug!("{} YubiKey interface(s) found", keys.len());

        Ok(keys)
    }

    /// Set polling back-off
    pub fn with_timing(mut self, timing: PollTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Interface description
    pub fn info(&self) -> &KeyInfo {
        &self.info
    }

    /// Check if this interface can run challenge-response
    pub fn is_otp_enabled(&self) -> bool {
        self.info.is_usable()
    }

    /// Check if open
    pub fn is_open(&self) -> bool {
        self.session.is_open() && self.transport.is_open()
    }

    /// Open the device handle
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The key is already open
    /// - The host refuses to open the interface
    pub async fn open(&mut self) -> Result<()> {
        if self.session.is_open() {
            return Err(yubihid_core::Error::InvalidSessionState(
                "YubiKey is already open".into(),
            )
            .into());
        }

        debug!("Opening {}...", self.transport.description());

        self.transport.open().await?;
        self.session.open()?;

        info!("Opened {}", self.info);
        Ok(())
    }

    /// Close the device handle
    pub async fn close(&mut self) -> Result<()> {
        self.session.ensure_open().map_err(|_| {
            yubihid_core::Error::InvalidSessionState("YubiKey is not open".into())
        })?;

        if let Err(e) = self.transport.close().await {
            warn!("Failed to close {}: {}", self.transport.description(), e);
            return Err(e.into());
        }
        self.session.close()?;

        debug!("Closed {}", self.info);
        Ok(())
    }

    /// Cancel the operation in flight
    ///
    /// The running operation notices at its next polling checkpoint, resets
    /// the device and fails with [`Error::Cancelled`](crate::Error::Cancelled).
    pub fn cancel(&self) {
        self.session.cancel();
    }

    /// Handle cancelling this key's operations from another task
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            session: self.session.clone(),
        }
    }

    /// Read the idle status block
    pub async fn read_status(&mut self) -> Result<DeviceStatus> {
        self.exchange().read_status().await
    }

    /// Read the device serial number
    pub async fn read_serial_number(&mut self) -> Result<u32> {
        self.session.ensure_open()?;

        debug!("Reading serial number...");

        let frame = Frame::build(ConfigSlot::DeviceSerial, &[0; SERIAL_REQUEST_SIZE])?;
        let raw = self.exchange().run(&frame, &mut |_: KeyState| {}).await?;
        let response = validate_response(&raw, SERIAL_SIZE)?;

        let serial = BigEndian::read_u32(&response);
        debug!("Serial number: {}", serial);

        Ok(serial)
    }

    /// Run HMAC-SHA1 challenge-response on `slot`
    ///
    /// `observer` hears when the key starts waiting for a touch or computing.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `slot` is not a challenge-response slot
    /// - `challenge` is longer than 64 bytes
    /// - The slot is not configured or the touch never came
    /// - The operation was cancelled
    pub async fn perform_challenge_response(
        &mut self,
        slot: ConfigSlot,
        challenge: &[u8],
        mut observer: impl FnMut(KeyState) + Send,
    ) -> Result<[u8; HMAC_RESPONSE_SIZE]> {
        if !slot.is_challenge_response() {
            return Err(yubihid_core::Error::UnsupportedSlot {
                slot,
                operation: "challenge-response",
            }
            .into());
        }
        self.session.ensure_open()?;

        debug!("Challenge-response on {} ({} bytes)", slot, challenge.len());

        let padded = padding::pkcs7(challenge, HMAC_CHALLENGE_SIZE)?;
        let frame = Frame::build(slot, &padded)?;
        let raw = self.exchange().run(&frame, &mut observer).await?;
        let response = validate_response(&raw, HMAC_RESPONSE_SIZE)?;

        let mut digest = [0u8; HMAC_RESPONSE_SIZE];
        digest.copy_from_slice(&response);

        Ok(digest)
    }

    fn exchange(&mut self) -> Exchange<'_> {
        Exchange::new(self.transport.as_mut(), &self.session, &self.timing)
    }
}

impl std::fmt::Debug for YubiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YubiKey")
            .field("info", &self.info)
            .field("transport", &self.transport.description())
            .field("session", &self.session.state())
            .finish()
    }
}
