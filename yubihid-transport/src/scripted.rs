//! Scripted transport simulating a device
//!
//! Replays a fixed sequence of reports so the protocol can be exercised
//! without hardware. Every report sent to the device is recorded and can be
//! inspected through a [`SentReports`] handle after the transport has been
//! moved into a device.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;
use yubihid_core::{
    Report, checksum,
    constants::{REPORT_DATA_SIZE, status_offsets},
    report,
    status::StatusFlags,
};

use crate::{Transport, error::*};

/// Firmware version reported by scripted status reports
const SCRIPTED_VERSION: (u8, u8, u8) = (5, 4, 3);

/// One scripted step on the receive side
enum Step {
    Report(Report),
    Fail(String),
    Action(Box<dyn FnOnce() + Send + Sync>),
}

/// Reports sent to a [`ScriptedTransport`]
#[derive(Debug, Clone, Default)]
pub struct SentReports(Arc<Mutex<Vec<Report>>>);

impl SentReports {
    /// Snapshot of everything sent so far
    pub fn all(&self) -> Vec<Report> {
        self.0.lock().clone()
    }

    /// Number of reports sent
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Last report sent
    pub fn last(&self) -> Option<Report> {
        self.0.lock().last().copied()
    }
}

/// Simulated device replaying scripted reports
///
/// # Examples
///
/// ```
/// use yubihid_transport::{ScriptedTransport, Transport};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let mut device = ScriptedTransport::new().idle(3);
/// device.open().await.unwrap();
///
/// let report = device.receive_report().await.unwrap();
/// assert_eq!(report[4], 3);
/// # });
/// ```
#[derive(Default)]
pub struct ScriptedTransport {
    steps: VecDeque<Step>,
    sent: SentReports,
    open: bool,
    fail_open: bool,
    fail_send: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the reports this transport receives from the host
    pub fn sent(&self) -> SentReports {
        self.sent.clone()
    }

    /// Refuse to open
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Refuse every outgoing report
    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    /// Queue a raw report
    pub fn report(mut self, report: Report) -> Self {
        self.steps.push_back(Step::Report(report));
        self
    }

    /// Queue a failing receive
    pub fn failure(mut self, message: impl Into<String>) -> Self {
        self.steps.push_back(Step::Fail(message.into()));
        self
    }

    /// Run `action` when the script reaches this point
    pub fn then(mut self, action: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.steps.push_back(Step::Action(Box::new(action)));
        self
    }

    /// Queue an idle status report with all slots configured
    pub fn idle(self, config_sequence: u8) -> Self {
        self.idle_with_touch(config_sequence, status_offsets::CONFIG_STATUS_MASK)
    }

    /// Queue an idle status report with explicit low touch byte
    pub fn idle_with_touch(self, config_sequence: u8, touch_low: u8) -> Self {
        let (major, minor, build) = SCRIPTED_VERSION;
        self.report([0, major, minor, build, config_sequence, touch_low, 0, 0])
    }

    /// Queue `count` idle reports
    ///
    /// The first carries the config sequence read before a write, the rest
    /// answer readiness polls.
    pub fn accept_write(mut self, config_sequence: u8, count: usize) -> Self {
        for _ in 0..count {
            self = self.idle(config_sequence);
        }
        self
    }

    /// Queue a report that is still busy taking a write
    pub fn write_busy(self) -> Self {
        self.report(report::new(&[], StatusFlags::SLOT_WRITE.bits()))
    }

    /// Queue a busy report
    pub fn processing(self) -> Self {
        self.report(report::new(&[], 0x01))
    }

    /// Queue a busy report asking for a touch
    pub fn waiting_for_touch(self) -> Self {
        self.report(report::new(&[], StatusFlags::TIMEOUT_WAIT.bits()))
    }

    /// Queue one pending chunk
    pub fn pending(self, data: &[u8], sequence: u8) -> Self {
        self.report(report::new(
            data,
            StatusFlags::PENDING.bits() | (sequence & StatusFlags::SEQUENCE_MASK),
        ))
    }

    /// Queue a complete response: `data` plus its frame check sequence in
    /// pending chunks, followed by the end-of-stream marker
    pub fn response(mut self, data: &[u8]) -> Self {
        let mut body = data.to_vec();
        body.extend_from_slice(&checksum::frame_check_sequence(data));

        for (sequence, chunk) in body.chunks(REPORT_DATA_SIZE).enumerate() {
            self = self.pending(chunk, sequence as u8);
        }
        self.pending(&[], 0)
    }

    /// Number of receive steps left
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::AlreadyOpen);
        }
        if self.fail_open {
            return Err(Error::Injected("open refused".into()));
        }
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn send_report(&mut self, report: &Report) -> Result<()> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        if self.fail_send {
            return Err(Error::Injected("send refused".into()));
        }

        trace!("Scripted device got: {}", hex::encode(report));
        self.sent.0.lock().push(*report);
        Ok(())
    }

    async fn receive_report(&mut self) -> Result<Report> {
        if !self.open {
            return Err(Error::NotOpen);
        }

        loop {
            match self.steps.pop_front() {
                Some(Step::Report(report)) => return Ok(report),
                Some(Step::Fail(message)) => return Err(Error::Injected(message)),
                Some(Step::Action(action)) => action(),
                None => return Err(Error::ScriptExhausted),
            }
        }
    }

    fn description(&self) -> String {
        "Scripted YubiKey".to_string()
    }
}
