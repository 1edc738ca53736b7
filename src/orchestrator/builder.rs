use std::collections::HashMap;

use crate::backend::Backend;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::evaluator::{Evaluator, RetryingEvaluator};
use crate::notify::{LogNotifier, Notifier};
use crate::telemetry::ProgressSink;
use crate::types::RunState;
use crate::variable::{self, Variable};

use super::{ReclaimHook, TrialOrchestrator};

/// A builder for [`TrialOrchestrator`]s.
///
/// Created via [`TrialOrchestrator::builder()`]. Variables and objectives are
/// declared in order; that order is the order of the evaluator's parameter
/// vector and objective values.
///
/// # Defaults
///
/// - Config: [`RunConfig::default()`]
/// - Notifier: [`LogNotifier`]
/// - No progress sink, no reclamation hook, no seed points
///
/// # Examples
///
/// ```
/// use std::sync::mpsc;
///
/// use trial_orchestrator::prelude::*;
///
/// let (tx, rx) = mpsc::channel();
/// let mut orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), |p: &[f64], _: u32| {
///     Ok::<_, Error>(Evaluation::new(vec![(p[0] - 1.0).powi(2), (p[1] + 1.0).powi(2)]))
/// })
/// .variables([Variable::float("a", -2.0, 2.0), Variable::integer("b", -3, 3)])
/// .objectives(["fa", "fb"])
/// .config(RunConfig::new(5).with_realtime_progress(true))
/// .progress_sink(tx)
/// .enqueue([("a".to_string(), 1.0), ("b".to_string(), -1.0)].into())
/// .build()
/// .unwrap();
///
/// orchestrator.run().unwrap();
/// drop(orchestrator);
///
/// let first = rx.recv().unwrap();
/// assert_eq!(first.current_parameters, vec![1.0, -1.0]);
/// assert_eq!(rx.iter().count(), 4);
/// ```
pub struct TrialOrchestratorBuilder<B, E> {
    backend: B,
    evaluator: E,
    variables: Vec<Variable>,
    objectives: Vec<String>,
    config: RunConfig,
    progress_sink: Option<Box<dyn ProgressSink + Send>>,
    notifier: Option<Box<dyn Notifier + Send>>,
    reclaim_hook: Option<ReclaimHook>,
    seeds: Vec<HashMap<String, f64>>,
}

impl<B: Backend, E: Evaluator> TrialOrchestratorBuilder<B, E> {
    pub(super) fn new(backend: B, evaluator: E) -> Self {
        Self {
            backend,
            evaluator,
            variables: Vec::new(),
            objectives: Vec::new(),
            config: RunConfig::default(),
            progress_sink: None,
            notifier: None,
            reclaim_hook: None,
            seeds: Vec::new(),
        }
    }

    /// Declare the next variable.
    #[must_use]
    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Declare several variables, in order.
    #[must_use]
    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Declare the next objective. Every objective is minimized.
    #[must_use]
    pub fn objective(mut self, name: impl Into<String>) -> Self {
        self.objectives.push(name.into());
        self
    }

    /// Declare several objectives, in order.
    #[must_use]
    pub fn objectives<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.objectives.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Receive a [`ProgressState`](crate::ProgressState) every cycle.
    #[must_use]
    pub fn progress_sink(mut self, sink: impl ProgressSink + Send + 'static) -> Self {
        self.progress_sink = Some(Box::new(sink));
        self
    }

    /// Receive the diagnostic message when the run aborts.
    ///
    /// Defaults to [`LogNotifier`] if not specified.
    #[must_use]
    pub fn notifier(mut self, notifier: impl Notifier + Send + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Hook called after trials per the config's
    /// [`GcPolicy`](crate::GcPolicy), to release heavyweight resources.
    #[must_use]
    pub fn reclaim_hook(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.reclaim_hook = Some(Box::new(hook));
        self
    }

    /// Queue a point, keyed by variable name, to be evaluated before any
    /// sampled one. Seeds are submitted in the order they were added.
    #[must_use]
    pub fn enqueue(mut self, params: HashMap<String, f64>) -> Self {
        self.seeds.push(params);
        self
    }

    /// Validate the declarations and build the orchestrator.
    ///
    /// Any stop request already pending on the config's
    /// [`StopSignal`](crate::StopSignal) is cleared; requests made after
    /// `build` returns are honored.
    ///
    /// # Errors
    ///
    /// Returns a variable validation error ([`Error::InvalidBounds`],
    /// [`Error::InvalidStep`], [`Error::InvalidVariableName`],
    /// [`Error::DuplicateVariable`]) or [`Error::EmptyObjectives`].
    pub fn build(self) -> Result<TrialOrchestrator<B, E>> {
        variable::validate_all(&self.variables)?;
        if self.objectives.is_empty() {
            return Err(Error::EmptyObjectives);
        }

        // Only requests left over from an earlier run are dropped.
        self.config.stop_signal.clear();

        let objective_count = self.objectives.len();
        Ok(TrialOrchestrator {
            backend: self.backend,
            evaluator: RetryingEvaluator::new(self.evaluator, objective_count),
            variables: self.variables,
            objectives: self.objectives,
            config: self.config,
            progress_sink: self.progress_sink,
            notifier: self
                .notifier
                .unwrap_or_else(|| Box::new(LogNotifier)),
            reclaim_hook: self.reclaim_hook,
            seeds: self.seeds,
            state: RunState::Idle,
            end_state: None,
            trials: Vec::new(),
        })
    }
}
