//! Per-cycle progress snapshots.
//!
//! [`ProgressTelemetry`] turns the backend's history into a [`ProgressState`]
//! once per cycle: the best-so-far frontier, a normalized hypervolume ratio
//! and an ETA. Frontier and ratio are opt-in because recomputing them gets
//! expensive for long studies.

use core::time::Duration;
use std::sync::mpsc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::pareto;

/// Snapshot of a run's progress, created once per cycle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgressState {
    /// Zero-based number of the cycle that produced this snapshot.
    pub trial_number: u64,
    pub objective_count: usize,
    /// Objective vectors of the backend's best trials; `None` when realtime
    /// progress is disabled.
    pub best_values: Option<Vec<Vec<f64>>>,
    /// Parameters evaluated in this cycle, in declared variable order.
    pub current_parameters: Vec<f64>,
    /// Progress measure in `[0, 1]`; see [`hypervolume_ratio`].
    pub hypervolume_ratio: f64,
    pub estimated_time_remaining: Duration,
}

/// Computes [`ProgressState`]s for one run.
#[derive(Clone, Debug)]
pub struct ProgressTelemetry {
    enabled: bool,
    objective_count: usize,
    max_trials: u64,
    timeout: Option<Duration>,
}

impl ProgressTelemetry {
    /// `enabled` turns on frontier and ratio computation.
    #[must_use]
    pub fn new(
        enabled: bool,
        objective_count: usize,
        max_trials: u64,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            enabled,
            objective_count,
            max_trials,
            timeout,
        }
    }

    /// Snapshot the run after evaluating cycle `trial_number`.
    #[must_use]
    pub fn compute<B: Backend>(
        &self,
        backend: &B,
        trial_number: u64,
        current_parameters: Vec<f64>,
        elapsed: Duration,
    ) -> ProgressState {
        let estimated_time_remaining =
            estimate_remaining(elapsed, trial_number, self.max_trials, self.timeout);

        if !self.enabled {
            return ProgressState {
                trial_number,
                objective_count: self.objective_count,
                best_values: None,
                current_parameters,
                hypervolume_ratio: 0.0,
                estimated_time_remaining,
            };
        }

        let front: Vec<Vec<f64>> = backend
            .best_trials()
            .into_iter()
            .map(|t| t.values)
            .collect();
        let ratio = if trial_number > 1 && self.objective_count > 1 {
            let population: Vec<Vec<f64>> = backend
                .completed_trials()
                .into_iter()
                .map(|t| t.values)
                .collect();
            hypervolume_ratio(trial_number, self.objective_count, &front, &population)
        } else {
            hypervolume_ratio(trial_number, self.objective_count, &front, &[])
        };

        ProgressState {
            trial_number,
            objective_count: self.objective_count,
            best_values: Some(front),
            current_parameters,
            hypervolume_ratio: ratio,
            estimated_time_remaining,
        }
    }
}

/// Normalized progress measure.
///
/// Zero before any data, one after the first trial or for a single
/// objective. Otherwise the hypervolume of `front` after min-max normalizing
/// each objective over `population`, with the reference point at the
/// normalized nadir.
#[must_use]
pub fn hypervolume_ratio(
    trial_number: u64,
    objective_count: usize,
    front: &[Vec<f64>],
    population: &[Vec<f64>],
) -> f64 {
    match (trial_number, objective_count) {
        (0, _) => 0.0,
        (1, _) | (_, 1) => 1.0,
        _ => pareto::normalized_hypervolume(front, population),
    }
}

/// Time left in the run.
///
/// With a timeout this is the time until it fires. Without one, elapsed time
/// is extrapolated over the remaining trials; the `+ 1` keeps the first
/// cycle finite.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate_remaining(
    elapsed: Duration,
    trial_number: u64,
    max_trials: u64,
    timeout: Option<Duration>,
) -> Duration {
    if let Some(timeout) = timeout {
        return timeout.saturating_sub(elapsed);
    }
    let remaining = max_trials.saturating_sub(trial_number) as f64;
    let scale = remaining / (trial_number as f64 + 1.0);
    Duration::try_from_secs_f64(elapsed.as_secs_f64() * scale).unwrap_or(Duration::MAX)
}

/// Receives a [`ProgressState`] every cycle.
///
/// Purely observational: a sink cannot slow down or stop the loop.
/// Implemented for `FnMut(&ProgressState)` closures and for
/// [`mpsc::Sender`]s, which drop snapshots once the receiver is gone.
pub trait ProgressSink {
    fn report(&mut self, state: &ProgressState);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressState),
{
    fn report(&mut self, state: &ProgressState) {
        self(state);
    }
}

impl ProgressSink for mpsc::Sender<ProgressState> {
    fn report(&mut self, state: &ProgressState) {
        let _ = self.send(state.clone());
    }
}
