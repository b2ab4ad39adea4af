//! Frame exchange over feature reports
//!
//! Write side: wait until the device stops flagging `SLOT_WRITE`, then push
//! the frame's reports, skipping blank middle chunks.
//!
//! Read side: poll reports until the device either streams a response
//! (pending chunks closed by a restart at sequence 0), goes idle, or the
//! caller cancels.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

use yubihid_core::{
    Frame, Report, Session, checksum,
    constants::{FRAME_PACKETS, REPORT_SIZE, status_offsets},
    report,
};
use yubihid_transport::Transport;
use yubihid_types::{DeviceStatus, KeyState};

use crate::config::PollTiming;
use crate::error::{Error, Result};

/// Observer notified while the device is busy
pub type Observer<'a> = &'a mut (dyn FnMut(KeyState) + Send);

/// One frame exchange against an open device
pub(crate) struct Exchange<'a> {
    transport: &'a mut dyn Transport,
    session: &'a Session,
    timing: &'a PollTiming,
}

impl<'a> Exchange<'a> {
    pub fn new(
        transport: &'a mut dyn Transport,
        session: &'a Session,
        timing: &'a PollTiming,
    ) -> Self {
        Self {
            transport,
            session,
            timing,
        }
    }

    /// Send `frame` and collect the device's answer
    pub async fn run(&mut self, frame: &Frame, observer: Observer<'_>) -> Result<Bytes> {
        debug!("Exchanging {}", frame);

        let config_sequence = self.send_frame(frame).await?;
        self.read_response(config_sequence, observer).await
    }

    /// Read the idle status block
    pub async fn read_status(&mut self) -> Result<DeviceStatus> {
        let received = self.receive().await?;
        let status = DeviceStatus::from_report(&received)?;

        debug!("Device status: {}", status);

        Ok(status)
    }

    async fn receive(&mut self) -> Result<Report> {
        self.session.ensure_open()?;

        let received = self.transport.receive_report().await?;
        trace!("Received: {}", hex::encode(received));

        Ok(received)
    }

    async fn send(&mut self, outgoing: &Report) -> Result<()> {
        self.session.ensure_open()?;

        trace!("Sending: {}", hex::encode(outgoing));
        self.transport.send_report(outgoing).await?;

        Ok(())
    }

    /// Abort the device's current operation, ignoring failures
    async fn reset(&mut self) {
        if let Err(e) = self.send(&report::reset()).await {
            warn!("Failed to reset device state: {}", e);
        }
    }

    /// Poll until the device accepts the next write report
    pub async fn await_ready_to_write(&mut self) -> Result<()> {
        for _ in 0..self.timing.ready_attempts {
            let received = self.receive().await?;
            if !report::status(&received).is_write_busy() {
                return Ok(());
            }

            sleep(self.timing.ready_interval).await;
            if self.session.is_cancelled() {
                return Err(Error::Cancelled);
            }
        }

        info!("Timeout waiting for YubiKey to become ready to receive");
        Err(Error::ResponseTimeout)
    }

    /// Transmit a frame
    ///
    /// Returns the config sequence seen before the write, which the read
    /// side compares against to recognise a completed operation.
    pub async fn send_frame(&mut self, frame: &Frame) -> Result<u8> {
        let config_sequence = self.receive().await?[status_offsets::CONFIG_SEQUENCE];

        let mut transmitted = 0;
        for (index, outgoing) in frame.segment().iter().enumerate() {
            if !must_transmit(index, outgoing) {
                continue;
            }
            self.await_ready_to_write().await?;
            self.send(outgoing).await?;
            transmitted += 1;
        }

        trace!(config_sequence, transmitted, "Frame sent");

        Ok(config_sequence)
    }

    /// Poll for the response to a frame sent at `config_sequence`
    pub async fn read_response(
        &mut self,
        config_sequence: u8,
        observer: Observer<'_>,
    ) -> Result<Bytes> {
        let mut response = BytesMut::new();
        let mut needs_touch = false;
        let mut expected_sequence = 0usize;

        loop {
            let received = self.receive().await?;
            let status = report::status(&received);

            if status.is_pending() {
                let sequence = status.sequence() as usize;

                if sequence == expected_sequence {
                    response.put_slice(report::data(&received));
                    expected_sequence += 1;
                } else if sequence == 0 {
                    // Numbering restarted: end of stream
                    self.reset().await;
                    trace!(len = response.len(), "Response complete");
                    return Ok(response.freeze());
                } else {
                    debug_assert!(
                        false,
                        "Unexpected sequence number received: {} (expected {})",
                        sequence, expected_sequence
                    );
                    error!(
                        "Unexpected sequence number received: {} (expected {})",
                        sequence, expected_sequence
                    );
                    return Err(Error::CommunicationFailure(format!(
                        "response chunk {} out of order",
                        sequence
                    )));
                }
            } else if status.is_idle() {
                let next_sequence = received[status_offsets::CONFIG_SEQUENCE];

                if !response.is_empty() {
                    error!("YubiKey went idle in the middle of a response");
                    return Err(Error::CommunicationFailure(
                        "response interrupted".into(),
                    ));
                }

                let config_changed = next_sequence == config_sequence.wrapping_add(1);
                let no_valid_config = config_sequence > 0
                    && next_sequence == 0
                    && received[status_offsets::TOUCH_LOW] & status_offsets::CONFIG_STATUS_MASK
                        == 0;

                if config_changed || no_valid_config {
                    return Ok(Bytes::copy_from_slice(&received[1..REPORT_SIZE - 1]));
                } else if needs_touch {
                    info!("Timed out waiting for touch");
                    return Err(Error::TouchTimeout);
                } else {
                    error!("YubiKey slot is not configured");
                    return Err(Error::SlotNotConfigured);
                }
            } else {
                let interval = if status.is_waiting_for_touch() {
                    observer(KeyState::WaitingForTouch);
                    needs_touch = true;
                    self.timing.touch_interval
                } else {
                    observer(KeyState::Processing);
                    self.timing.busy_interval
                };

                sleep(interval).await;
                if self.session.is_cancelled() {
                    self.reset().await;
                    return Err(Error::Cancelled);
                }
            }
        }
    }
}

/// Sparse write rule: first and last chunk always go out, middle chunks
/// only when they carry data. The device keeps zeros from earlier writes.
pub(crate) fn must_transmit(index: usize, outgoing: &Report) -> bool {
    index == 0 || index == FRAME_PACKETS - 1 || !report::is_blank(outgoing)
}

/// Check the CRC residue of a raw response and cut it to `expected` bytes
pub(crate) fn validate_response(raw: &Bytes, expected: usize) -> Result<Bytes> {
    let with_crc = &raw[..raw.len().min(expected + 2)];

    if !checksum::verify_residue(with_crc) {
        warn!("USB HID response has invalid CRC");
        return Err(Error::CommunicationFailure("invalid response CRC".into()));
    }

    if raw.len() < expected {
        warn!(len = raw.len(), expected, "USB HID response too short");
        return Err(Error::CommunicationFailure("response too short".into()));
    }

    Ok(raw.slice(..expected))
}
