//! Run configuration.

use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gate::{DEFAULT_HITL_BATCH, DEFAULT_POLL_INTERVAL};
use crate::stop::{StopSignal, timeout_from_seconds};
use crate::types::GcPolicy;

/// Settings for one orchestrator run.
///
/// ```
/// use trial_orchestrator::{GcPolicy, RunConfig, StopSignal};
///
/// let signal = StopSignal::new();
/// let config = RunConfig::new(200)
///     .with_timeout_seconds(3600.0)
///     .with_stop_signal(signal.clone())
///     .with_gc_policy(GcPolicy::Always)
///     .with_realtime_progress(true);
///
/// assert_eq!(config.max_trials, 200);
/// assert!(config.timeout().is_some());
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunConfig {
    /// Number of trials after which the run ends.
    pub max_trials: u64,
    /// Wall-clock budget for the whole run; `<= 0` means unbounded.
    pub timeout_seconds: f64,
    /// Cancellation flag shared with the caller.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub stop_signal: StopSignal,
    /// Maximum number of trials awaiting human review, `None` to tell every
    /// trial immediately.
    pub human_in_the_loop_batch: Option<usize>,
    pub gc_policy: GcPolicy,
    /// Compute the best frontier and hypervolume ratio every cycle.
    pub realtime_progress: bool,
    /// Allow resuming an existing study of the same name.
    pub continue_study: bool,
    pub study_name: String,
    /// How often the concurrency gate re-checks the backend.
    pub gate_poll_interval: Duration,
}

impl RunConfig {
    /// Defaults with a trial budget of `max_trials`.
    #[must_use]
    pub fn new(max_trials: u64) -> Self {
        Self {
            max_trials,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_stop_signal(mut self, signal: StopSignal) -> Self {
        self.stop_signal = signal;
        self
    }

    /// Enable human-in-the-loop mode with the given batch limit.
    #[must_use]
    pub fn with_human_in_the_loop(mut self, batch: usize) -> Self {
        self.human_in_the_loop_batch = Some(batch);
        self
    }

    /// Enable human-in-the-loop mode with the default batch limit of three.
    #[must_use]
    pub fn with_default_human_in_the_loop(self) -> Self {
        self.with_human_in_the_loop(DEFAULT_HITL_BATCH)
    }

    #[must_use]
    pub fn with_gc_policy(mut self, policy: GcPolicy) -> Self {
        self.gc_policy = policy;
        self
    }

    #[must_use]
    pub fn with_realtime_progress(mut self, enabled: bool) -> Self {
        self.realtime_progress = enabled;
        self
    }

    #[must_use]
    pub fn with_continue_study(mut self, allowed: bool) -> Self {
        self.continue_study = allowed;
        self
    }

    #[must_use]
    pub fn with_study_name(mut self, name: impl Into<String>) -> Self {
        self.study_name = name.into();
        self
    }

    #[must_use]
    pub fn with_gate_poll_interval(mut self, interval: Duration) -> Self {
        self.gate_poll_interval = interval;
        self
    }

    /// The timeout as a duration, `None` when unbounded.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        timeout_from_seconds(self.timeout_seconds)
    }

    #[must_use]
    pub fn is_human_in_the_loop(&self) -> bool {
        self.human_in_the_loop_batch.is_some()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_trials: 100,
            timeout_seconds: 0.0,
            stop_signal: StopSignal::new(),
            human_in_the_loop_batch: None,
            gc_policy: GcPolicy::default(),
            realtime_progress: false,
            continue_study: false,
            study_name: "study1".to_string(),
            gate_poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
