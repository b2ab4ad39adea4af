//! Session management for the YubiKey HID protocol
//!
//! A session tracks:
//! - Whether the device handle is open
//! - The cancellation flag of the operation in flight

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Device handle closed
    Closed,

    /// Device handle open and ready for exchanges
    Open,
}

/// Session manager
///
/// Tracks open/closed state and cancellation.
/// Thread-safe and can be cloned cheaply (Arc internally), so a clone can
/// cancel an operation running elsewhere.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Set by `cancel`, cleared on open and close
    cancelled: AtomicBool,

    /// Current session state
    state: parking_lot::RwLock<SessionState>,
}

impl Session {
    /// Create a new closed session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                cancelled: AtomicBool::new(false),
                state: parking_lot::RwLock::new(SessionState::Closed),
            }),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if open
    pub fn is_open(&self) -> bool {
        matches!(self.state(), SessionState::Open)
    }

    /// Fail unless open
    pub fn ensure_open(&self) -> Result<()> {
        if !self.is_open() {
            return Err(Error::SessionNotOpen);
        }
        Ok(())
    }

    /// Mark session as open
    ///
    /// Opening twice is a caller bug and is rejected.
    pub fn open(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Closed {
            return Err(Error::InvalidSessionState(
                format!("Cannot open from state: {:?}", *state)
            ));
        }

        self.inner.cancelled.store(false, Ordering::Release);
        *state = SessionState::Open;

        Ok(())
    }

    /// Mark session as closed
    ///
    /// Closing twice is a caller bug and is rejected.
    pub fn close(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Open {
            return Err(Error::InvalidSessionState(
                format!("Cannot close from state: {:?}", *state)
            ));
        }

        self.inner.cancelled.store(false, Ordering::Release);
        *state = SessionState::Closed;

        Ok(())
    }

    /// Request cancellation of the operation in flight
    ///
    /// Ignored while closed.
    pub fn cancel(&self) {
        let state = self.inner.state.read();

        if *state == SessionState::Open {
            debug!("Cancellation requested");
            self.inner.cancelled.store(true, Ordering::Release);
        }
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.is_open());
        assert!(!session.is_cancelled());
        assert!(matches!(session.ensure_open(), Err(Error::SessionNotOpen)));
    }

    #[test]
    fn test_session_open_close() {
        let session = Session::new();
        session.open().unwrap();
        assert!(session.is_open());
        session.ensure_open().unwrap();

        session.close().unwrap();
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_double_open_and_close_rejected() {
        let session = Session::new();

        assert!(matches!(session.close(), Err(Error::InvalidSessionState(_))));

        session.open().unwrap();
        assert!(matches!(session.open(), Err(Error::InvalidSessionState(_))));
        assert!(session.is_open());
    }

    #[test]
    fn test_cancel_ignored_while_closed() {
        let session = Session::new();
        session.cancel();
        assert!(!session.is_cancelled());
    }

    #[test]
    fn test_cancel_reset_on_reopen() {
        let session = Session::new();
        session.open().unwrap();
        session.cancel();
        assert!(session.is_cancelled());

        session.close().unwrap();
        assert!(!session.is_cancelled());

        session.open().unwrap();
        assert!(!session.is_cancelled());
    }

    #[test]
    fn test_session_clone_cancels_across_threads() {
        let session1 = Session::new();
        session1.open().unwrap();

        let session2 = session1.clone();
        std::thread::spawn(move || session2.cancel())
            .join()
            .unwrap();

        assert!(session1.is_cancelled());
    }
}
