//! Polling configuration

use std::time::Duration;

use yubihid_core::constants::polling;

/// Back-off used while waiting on the device
///
/// Every sleep is also a cancellation checkpoint, so the intervals bound how
/// quickly a cancel request takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    /// Readiness checks before a write gives up with `ResponseTimeout`
    pub ready_attempts: usize,

    /// Delay between readiness checks
    pub ready_interval: Duration,

    /// Delay between polls while the device computes
    pub busy_interval: Duration,

    /// Delay between polls while the device waits for a touch
    pub touch_interval: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            ready_attempts: polling::READY_ATTEMPTS,
            ready_interval: Duration::from_millis(polling::READY_INTERVAL_MS),
            busy_interval: Duration::from_millis(polling::BUSY_INTERVAL_MS),
            touch_interval: Duration::from_millis(polling::TOUCH_INTERVAL_MS),
        }
    }
}
