//! Cap on trials parked for human review.
//!
//! In human-in-the-loop mode every trial stays running in the backend until a
//! reviewer completes it. The gate keeps the loop from asking for a new trial
//! while `batch_limit` trials are already waiting.

use core::time::Duration;
use std::thread;

use crate::backend::Backend;
use crate::stop::StopPolicy;
use crate::types::EndState;

/// Batch size used when human-in-the-loop mode is enabled without one.
pub const DEFAULT_HITL_BATCH: usize = 3;

/// Default interval between polls of the backend's running-trial count.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConcurrencyGate {
    batch_limit: Option<usize>,
    poll_interval: Duration,
}

impl ConcurrencyGate {
    /// A gate that always opens.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            batch_limit: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// A gate admitting at most `batch_limit` outstanding trials. A limit of
    /// zero is raised to one so the gate can open at all.
    #[must_use]
    pub fn with_batch_limit(batch_limit: usize, poll_interval: Duration) -> Self {
        Self {
            batch_limit: Some(batch_limit.max(1)),
            poll_interval,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.batch_limit.is_some()
    }

    #[must_use]
    pub fn batch_limit(&self) -> Option<usize> {
        self.batch_limit
    }

    /// Whether a new trial may start with `outstanding` trials unresolved.
    #[must_use]
    pub fn may_start_next_trial(&self, outstanding: usize) -> bool {
        self.batch_limit.is_none_or(|limit| outstanding < limit)
    }

    /// Block until the gate opens.
    ///
    /// Polls the backend's running-trial count every poll interval and checks
    /// `policy` on each poll, so a gate that never reopens still ends at the
    /// timeout or on a stop request. Returns the end state if the policy
    /// fired while waiting.
    #[must_use]
    pub fn wait<B: Backend>(
        &self,
        backend: &B,
        policy: &StopPolicy,
        trial_number: u64,
    ) -> Option<EndState> {
        let mut logged = false;
        loop {
            let outstanding = backend.running_trial_count();
            if self.may_start_next_trial(outstanding) {
                return None;
            }
            if !logged {
                trace_debug!(outstanding, trial_number, "waiting for human review");
                logged = true;
            }
            if let Some(end) = policy.should_stop(trial_number) {
                return Some(end);
            }
            thread::sleep(self.poll_interval);
        }
    }
}

impl Default for ConcurrencyGate {
    fn default() -> Self {
        Self::disabled()
    }
}
