use std::thread::{self, JoinHandle};

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::evaluator::{Artifact, Evaluated, Evaluation, Evaluator};
use crate::gate::ConcurrencyGate;
use crate::stop::{StopPolicy, StopSignal};
use crate::telemetry::ProgressTelemetry;
use crate::trial::Trial;
use crate::types::{EndState, RunState};

use super::{Optimum, RunOutcome, TrialOrchestrator};

/// Study attribute listing the variable names in declared order.
pub const VARIABLE_NAMES_ATTR: &str = "variable_names";
/// Study attribute listing the objective names in declared order.
pub const OBJECTIVE_NAMES_ATTR: &str = "objective_names";
/// Study attribute recording the crate version that ran the study.
pub const VERSION_ATTR: &str = "orchestrator_version";
/// Trial attribute holding serialized geometry artifacts.
pub const GEOMETRY_ATTR: &str = "geometry";
/// Trial attribute whose values are constraint numbers, stored normalized.
pub const CONSTRAINT_ATTR: &str = "constraint";

impl<B: Backend, E: Evaluator> TrialOrchestrator<B, E> {
    /// Run the loop to completion on the current thread.
    ///
    /// Returns `Ok` for every normal ending, including the precondition
    /// checks on an existing study ([`EndState::ContinuePreconditionFailed`],
    /// [`EndState::DirectionCountMismatch`]), which end the run before any
    /// trial is asked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyStarted`] if this orchestrator already ran.
    /// Any fatal error (retry limit, evaluator or backend failure, a
    /// non-numeric constraint value, a best trial missing a variable) is
    /// passed to the notifier, recorded as [`EndState::Error`] and returned.
    pub fn run(&mut self) -> Result<RunOutcome> {
        if self.state != RunState::Idle {
            return Err(Error::AlreadyStarted);
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "run",
            study = %self.config.study_name,
            max_trials = self.config.max_trials,
            objectives = self.objectives.len(),
        )
        .entered();

        if let Some(end_state) = self.check_preconditions() {
            trace_warn!(?end_state, "existing study cannot be continued");
            return Ok(self.finish(end_state, None));
        }

        self.state = RunState::Running;
        trace_info!("optimization started");

        match self.execute() {
            Ok((end_state, optimum)) => {
                trace_info!(?end_state, trials = self.trials.len(), "optimization finished");
                Ok(self.finish(end_state, optimum))
            }
            Err(e) => Err(self.abort(e)),
        }
    }

    fn execute(&mut self) -> Result<(EndState, Option<Optimum>)> {
        self.prepare()?;
        let end_state = self.run_loop()?;
        let optimum = self.extract_optimum()?;
        Ok((end_state, optimum))
    }

    fn check_preconditions(&self) -> Option<EndState> {
        let existing = self
            .backend
            .existing_objective_count(&self.config.study_name)?;
        if !self.config.continue_study {
            return Some(EndState::ContinuePreconditionFailed);
        }
        (existing != self.objectives.len()).then_some(EndState::DirectionCountMismatch)
    }

    fn prepare(&mut self) -> Result<()> {
        self.backend
            .open_study(&self.config.study_name, &self.objectives)?;

        let variable_names = self
            .variables
            .iter()
            .map(|v| v.name().to_string())
            .collect();
        self.backend
            .set_study_attr(VARIABLE_NAMES_ATTR, variable_names)?;
        self.backend
            .set_study_attr(OBJECTIVE_NAMES_ATTR, self.objectives.clone())?;
        self.backend
            .set_study_attr(VERSION_ATTR, vec![env!("CARGO_PKG_VERSION").to_string()])?;

        for seed in &self.seeds {
            if !self.backend.enqueue(seed, true)? {
                trace_debug!(?seed, "seed point already in study, skipped");
            }
        }
        Ok(())
    }

    fn run_loop(&mut self) -> Result<EndState> {
        let policy = StopPolicy::new(
            self.config.max_trials,
            self.config.timeout_seconds,
            self.config.stop_signal.clone(),
        );
        let gate = self
            .config
            .human_in_the_loop_batch
            .map_or_else(ConcurrencyGate::disabled, |batch| {
                ConcurrencyGate::with_batch_limit(batch, self.config.gate_poll_interval)
            });
        let telemetry = ProgressTelemetry::new(
            self.config.realtime_progress,
            self.objectives.len(),
            self.config.max_trials,
            policy.timeout(),
        );

        let mut trial_number = 0;
        loop {
            if let Some(end_state) = policy.should_stop(trial_number) {
                return Ok(end_state);
            }
            if gate.is_enabled()
                && let Some(end_state) = gate.wait(&self.backend, &policy, trial_number)
            {
                return Ok(end_state);
            }
            self.run_cycle(trial_number, &policy, &telemetry)?;
            trial_number += 1;
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn run_cycle(
        &mut self,
        trial_number: u64,
        policy: &StopPolicy,
        telemetry: &ProgressTelemetry,
    ) -> Result<()> {
        let mut trial = Trial::start(trial_number);

        let candidate = self.backend.ask()?;
        let progress = progress_percent(trial_number, self.config.max_trials);
        let Evaluated {
            candidate,
            parameters,
            evaluation,
            nan_retries,
        } = self.evaluator.evaluate(
            &mut self.backend,
            candidate,
            &self.variables,
            trial_number,
            progress,
        )?;
        trial.parameters.clone_from(&parameters);
        trial.objective_values.clone_from(&evaluation.objective_values);

        let snapshot = telemetry.compute(&self.backend, trial_number, parameters, policy.elapsed());
        if let Some(sink) = &mut self.progress_sink {
            sink.report(&snapshot);
        }

        let has_artifacts = !evaluation.artifacts.is_empty();
        let handed_over = self.attach_and_hand_over(candidate, evaluation, &mut trial);
        if self.config.gc_policy.should_reclaim(has_artifacts)
            && let Some(hook) = &mut self.reclaim_hook
        {
            hook();
        }
        handed_over?;

        trial.mark_completed();
        trace_info!(
            trial = trial_number,
            values = ?trial.objective_values,
            nan_retries,
            "trial completed"
        );
        self.trials.push(trial);
        Ok(())
    }

    /// Record attributes and artifacts on the trial, then tell it, or park it
    /// for review in human-in-the-loop mode.
    fn attach_and_hand_over(
        &mut self,
        candidate: B::Candidate,
        evaluation: Evaluation,
        trial: &mut Trial,
    ) -> Result<()> {
        let Evaluation {
            objective_values,
            mut attributes,
            artifacts,
        } = evaluation;

        if let Some(values) = attributes.get_mut(CONSTRAINT_ATTR) {
            *values = parse_constraints(values)?;
        }

        let mut images = Vec::new();
        for artifact in artifacts {
            match artifact {
                Artifact::Geometry(geometry) => attributes
                    .entry(GEOMETRY_ATTR.to_string())
                    .or_default()
                    .push(geometry),
                Artifact::Image(bytes) => images.push(bytes),
            }
        }

        let human_in_the_loop = self.config.is_human_in_the_loop();
        if human_in_the_loop {
            for (name, value) in self.objectives.iter().zip(&objective_values) {
                attributes.insert(format!("result_{name}"), vec![value.to_string()]);
            }
        }

        for (key, values) in &attributes {
            self.backend.set_trial_attr(&candidate, key, values.clone())?;
        }
        if !images.is_empty() {
            self.backend.attach_images(&candidate, &images)?;
        }
        trial.attributes = attributes;

        if human_in_the_loop {
            self.backend.park(candidate)
        } else {
            self.backend.tell(candidate, &objective_values)
        }
    }

    fn finish(&mut self, end_state: EndState, optimum: Option<Optimum>) -> RunOutcome {
        self.end_state = Some(end_state);
        self.state = RunState::Completed;
        RunOutcome {
            end_state,
            optimum,
            trials: self.trials.clone(),
        }
    }

    fn abort(&mut self, error: Error) -> Error {
        self.notifier.fatal(&error.to_string());
        self.end_state = Some(EndState::Error);
        self.state = RunState::Aborted;
        error
    }
}

impl<B, E> TrialOrchestrator<B, E>
where
    B: Backend + Send + 'static,
    E: Evaluator + Send + 'static,
{
    /// Run the loop on a dedicated worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerSpawn`] if the thread cannot be created.
    pub fn spawn(self) -> Result<RunHandle> {
        let signal = self.config.stop_signal.clone();
        let name = format!("optimize-{}", self.config.study_name);
        let handle = thread::Builder::new().name(name).spawn(move || {
            let mut orchestrator = self;
            orchestrator.run()
        })?;
        Ok(RunHandle { handle, signal })
    }
}

/// A run executing on its worker thread.
#[derive(Debug)]
pub struct RunHandle {
    handle: JoinHandle<Result<RunOutcome>>,
    signal: StopSignal,
}

impl RunHandle {
    /// Ask the run to stop after the current trial.
    pub fn request_stop(&self) {
        self.signal.request_stop();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to end.
    ///
    /// # Errors
    ///
    /// Returns the run's own error, or [`Error::WorkerPanicked`] if the
    /// worker thread panicked.
    pub fn join(self) -> Result<RunOutcome> {
        self.handle.join().map_err(|_| Error::WorkerPanicked)?
    }
}

fn parse_constraints(values: &[String]) -> Result<Vec<String>> {
    values
        .iter()
        .map(|raw| match raw.trim().parse::<f64>() {
            Ok(v) if !v.is_nan() => Ok(v.to_string()),
            _ => Err(Error::InvalidConstraint(raw.clone())),
        })
        .collect()
}

/// The run's progress in percent after `trial_number` trials.
#[allow(clippy::cast_possible_truncation)]
fn progress_percent(trial_number: u64, max_trials: u64) -> u32 {
    if max_trials == 0 {
        return 100;
    }
    (trial_number.saturating_mul(100) / max_trials).min(100) as u32
}
