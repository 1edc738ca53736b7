//! Loop termination: trial budget, wall-clock timeout and user stop.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use crate::types::EndState;

/// Shared cancellation flag.
///
/// Clones share one flag. Any thread may [`request_stop`](Self::request_stop);
/// the loop reads it at cycle boundaries and while waiting on the concurrency
/// gate, so at most one more trial runs after a request.
///
/// ```
/// use trial_orchestrator::StopSignal;
///
/// let signal = StopSignal::new();
/// let remote = signal.clone();
/// remote.request_stop();
/// assert!(signal.take());
/// assert!(!signal.take());
/// ```
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running loop to stop after the current trial.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a stop is pending.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Consume a pending request, resetting the flag.
    #[must_use]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// Drop any pending request.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Decides when the loop ends.
///
/// Checks, first match wins: trial count, timeout, stop request.
#[derive(Debug)]
pub struct StopPolicy {
    max_trials: u64,
    timeout: Option<Duration>,
    started_at: Instant,
    signal: StopSignal,
}

impl StopPolicy {
    /// A policy whose clock starts now. `timeout_seconds <= 0` means no
    /// timeout.
    #[must_use]
    pub fn new(max_trials: u64, timeout_seconds: f64, signal: StopSignal) -> Self {
        Self::started_at(max_trials, timeout_seconds, signal, Instant::now())
    }

    /// A policy whose clock started at `started_at`.
    #[must_use]
    pub fn started_at(
        max_trials: u64,
        timeout_seconds: f64,
        signal: StopSignal,
        started_at: Instant,
    ) -> Self {
        Self {
            max_trials,
            timeout: timeout_from_seconds(timeout_seconds),
            started_at,
            signal,
        }
    }

    /// The end state to stop with after `trial_number` trials, if any.
    ///
    /// A stop request is consumed when it decides the outcome, so it cannot
    /// stop the next run. It is left pending when an earlier check wins.
    #[must_use]
    pub fn should_stop(&self, trial_number: u64) -> Option<EndState> {
        if trial_number >= self.max_trials {
            return Some(EndState::AllTrialsCompleted);
        }
        if self.timeout.is_some_and(|t| self.elapsed() >= t) {
            return Some(EndState::Timeout);
        }
        if self.signal.take() {
            return Some(EndState::StoppedByUser);
        }
        None
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    #[must_use]
    pub fn max_trials(&self) -> u64 {
        self.max_trials
    }

    /// The configured timeout, `None` when unbounded.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// `None` for non-positive, NaN or unrepresentable timeouts.
pub(crate) fn timeout_from_seconds(seconds: f64) -> Option<Duration> {
    if seconds > 0.0 {
        Duration::try_from_secs_f64(seconds).ok()
    } else {
        None
    }
}
