//! Auto-flow: unattended round-robin turns in an arena.
//!
//! After each completed response the host asks the scheduler for the next
//! turn. The scheduler waits a fixed delay and fires unless it was
//! cancelled in the meantime. A pending wait is cancelled, never merely
//! ignored, when the scheduler is disabled or dropped, when the host
//! reports a response in flight, or when fewer than two assistants remain.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Pause between unattended turns.
pub const AUTO_FLOW_DELAY: Duration = Duration::from_millis(2500);

/// Minimum assistants for auto-flow to run.
pub const MIN_FLOW_ASSISTANTS: usize = 2;

/// Snapshot of the conversation state that decides whether a turn may be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowEligibility {
    pub assistant_count: usize,
    pub in_flight: bool,
}

impl FlowEligibility {
    pub fn allows_turn(&self) -> bool {
        !self.in_flight && self.assistant_count >= MIN_FLOW_ASSISTANTS
    }
}

/// Outcome of waiting for the next unattended turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDecision {
    /// The delay elapsed; run the next rotation turn.
    Fire,
    /// Disabled, or the state does not allow a turn.
    Ineligible,
    /// The pending wait was cancelled.
    Cancelled,
}

/// Per-conversation auto-flow timer.
pub struct AutoFlowScheduler {
    delay: Duration,
    enabled: AtomicBool,
    shutdown: CancellationToken,
    pending: Mutex<Option<CancellationToken>>,
}

impl AutoFlowScheduler {
    /// A disabled scheduler with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            enabled: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            pending: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Turn auto-flow off and cancel any pending turn.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.cancel_pending();
    }

    /// Cancel the pending turn, if any. Call when a response starts.
    pub fn cancel_pending(&self) {
        if let Some(token) = self.take_pending() {
            debug!("cancelling pending auto-flow turn");
            token.cancel();
        }
    }

    /// Token cancelled when the scheduler is torn down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Wait for the next turn in place.
    ///
    /// Replaces any earlier pending wait. Returns immediately with
    /// [`FlowDecision::Ineligible`] when the turn is not allowed.
    pub async fn wait_for_turn(&self, eligibility: FlowEligibility) -> FlowDecision {
        let Some(token) = self.arm(eligibility) else {
            return FlowDecision::Ineligible;
        };
        let decision = tokio::select! {
            _ = token.cancelled() => FlowDecision::Cancelled,
            _ = tokio::time::sleep(self.delay) => FlowDecision::Fire,
        };
        token.cancel();
        self.clear_finished();
        decision
    }

    fn arm(&self, eligibility: FlowEligibility) -> Option<CancellationToken> {
        self.cancel_pending();
        if !self.is_enabled() || !eligibility.allows_turn() {
            debug!(?eligibility, enabled = self.is_enabled(), "auto-flow turn not scheduled");
            return None;
        }
        let token = self.shutdown.child_token();
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(token.clone());
        }
        Some(token)
    }

    fn take_pending(&self) -> Option<CancellationToken> {
        self.pending.lock().ok().and_then(|mut p| p.take())
    }

    // A finished wait cancels its own token; a newer pending turn is left alone.
    fn clear_finished(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if pending.as_ref().is_some_and(CancellationToken::is_cancelled) {
                *pending = None;
            }
        }
    }
}

impl Default for AutoFlowScheduler {
    fn default() -> Self {
        Self::new(AUTO_FLOW_DELAY)
    }
}

impl Drop for AutoFlowScheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
