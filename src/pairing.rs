//! Time-boxed pairing against the bridge's link button window.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, warn};
use strum_macros::Display;
use tokio::time::Instant;

use crate::bridge::BridgeClient;

/// Where a pairing session currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PairingState {
    #[default]
    Idle,
    Pairing,
    Succeeded,
    Cancelled,
    Expired,
}

/// How a finished pairing session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingOutcome {
    /// The bridge handed out a credential.
    Succeeded(String),
    /// [`PairingSession::cancel`] was observed before the next attempt.
    Cancelled,
    /// The deadline passed without the link button being pressed.
    Expired,
}

/// One pairing attempt chain against a single bridge.
///
/// Pairing needs a physical button press on the bridge within a
/// real-world window, so the session retries a registration call every
/// 500 ms until it succeeds, is cancelled, or the deadline passes. A
/// session holds a single linear chain of attempts; two chains never run
/// concurrently for the same bridge.
///
/// Cancellation is cooperative: it is checked before each attempt and
/// after each retry delay, and never aborts an in-flight request.
#[derive(Debug, Default)]
pub struct PairingSession {
    state: Mutex<PairingState>,
    active: AtomicBool,
}

impl PairingSession {
    const RETRY_DELAY: Duration = Duration::from_millis(500);

    pub fn new() -> Self {
        Self::default()
    }

    /// The current state of this session.
    pub fn state(&self) -> PairingState {
        *self.state.lock().unwrap()
    }

    /// Request cancellation of an active session.
    ///
    /// A no-op once the session has already finished.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == PairingState::Pairing {
            *state = PairingState::Cancelled;
            self.active.store(false, Ordering::SeqCst);
            debug!("pairing cancelled");
        }
    }

    /// Drive the attempt chain until success, cancellation, or timeout.
    ///
    /// The first attempt is issued immediately; the deadline is
    /// `now + timeout`, checked at every retry decision point rather than
    /// aborting any single in-flight request.
    pub async fn run(&self, client: &BridgeClient, timeout: Duration) -> PairingOutcome {
        self.active.store(true, Ordering::SeqCst);
        *self.state.lock().unwrap() = PairingState::Pairing;
        let deadline = Instant::now() + timeout;

        loop {
            if !self.active.load(Ordering::SeqCst) {
                self.set_state(PairingState::Cancelled);
                return PairingOutcome::Cancelled;
            }

            match client.register().await {
                Ok(credential) => {
                    // A cancellation that landed while the request was in
                    // flight wins: the credential must not be acted on.
                    if !self.active.swap(false, Ordering::SeqCst) {
                        self.set_state(PairingState::Cancelled);
                        return PairingOutcome::Cancelled;
                    }
                    self.set_state(PairingState::Succeeded);
                    debug!("pairing succeeded");
                    return PairingOutcome::Succeeded(credential);
                }
                Err(e) if e.is_link_button() => {
                    debug!("link button not pressed yet");
                }
                Err(e) => {
                    warn!("pairing attempt failed: {e}");
                }
            }

            if Instant::now() >= deadline {
                self.active.store(false, Ordering::SeqCst);
                self.set_state(PairingState::Expired);
                debug!("pairing window expired");
                return PairingOutcome::Expired;
            }
            tokio::time::sleep(Self::RETRY_DELAY).await;
        }
    }

    /// Mark the session succeeded without running an attempt chain.
    ///
    /// Used when a credential is already known: pairing short-circuits
    /// and no registration request is ever issued.
    pub(crate) fn short_circuit(&self) {
        *self.state.lock().unwrap() = PairingState::Succeeded;
    }

    fn set_state(&self, new: PairingState) {
        let mut state = self.state.lock().unwrap();
        // Cancellation may have landed while an attempt was in flight;
        // it wins over any later transition.
        if *state == PairingState::Cancelled && new != PairingState::Cancelled {
            return;
        }
        *state = new;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = PairingSession::new();
        assert_eq!(session.state(), PairingState::Idle);
    }

    #[test]
    fn test_cancel_before_start_is_noop() {
        let session = PairingSession::new();
        session.cancel();
        assert_eq!(session.state(), PairingState::Idle);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PairingState::Pairing.to_string(), "pairing");
        assert_eq!(PairingState::Expired.to_string(), "expired");
    }
}
