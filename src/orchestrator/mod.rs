//! The ask → evaluate → tell loop.
//!
//! A [`TrialOrchestrator`] owns a [`Backend`], an [`Evaluator`] and a
//! [`RunConfig`], and runs trials one after another until the stop policy
//! fires or a fatal error aborts the run:
//!
//! ```
//! use trial_orchestrator::prelude::*;
//!
//! let mut orchestrator = TrialOrchestrator::builder(
//!     MemoryBackend::with_sampler(RandomSampler::with_seed(7)),
//!     |p: &[f64], _progress: u32| Ok::<_, Error>(Evaluation::new(vec![p[0] * p[0]])),
//! )
//! .variable(Variable::float("x", -10.0, 10.0))
//! .objective("f")
//! .config(RunConfig::new(20))
//! .build()
//! .unwrap();
//!
//! let outcome = orchestrator.run().unwrap();
//! assert_eq!(outcome.end_state, EndState::AllTrialsCompleted);
//! assert_eq!(outcome.trials.len(), 20);
//! let optimum = outcome.optimum.unwrap();
//! assert!(outcome.trials.iter().all(|t| optimum.objective_values[0] <= t.objective_values[0]));
//! ```

mod builder;
mod optimum;
mod run;

#[cfg(feature = "async")]
mod async_impl;

use std::collections::HashMap;

pub use builder::TrialOrchestratorBuilder;
pub use optimum::reorder_by_name;
pub use run::{
    CONSTRAINT_ATTR, GEOMETRY_ATTR, OBJECTIVE_NAMES_ATTR, RunHandle, VARIABLE_NAMES_ATTR,
    VERSION_ATTR,
};

use crate::backend::Backend;
use crate::config::RunConfig;
use crate::evaluator::{Evaluator, RetryingEvaluator};
use crate::notify::Notifier;
use crate::telemetry::ProgressSink;
use crate::trial::Trial;
use crate::types::{EndState, RunState};
use crate::variable::Variable;

type ReclaimHook = Box<dyn FnMut() + Send>;

/// Drives one optimization run.
///
/// Built with [`TrialOrchestrator::builder`]. Each orchestrator runs once:
/// `Idle → Running → Completed | Aborted`.
pub struct TrialOrchestrator<B: Backend, E: Evaluator> {
    backend: B,
    evaluator: RetryingEvaluator<E>,
    variables: Vec<Variable>,
    objectives: Vec<String>,
    config: RunConfig,
    progress_sink: Option<Box<dyn ProgressSink + Send>>,
    notifier: Box<dyn Notifier + Send>,
    reclaim_hook: Option<ReclaimHook>,
    seeds: Vec<HashMap<String, f64>>,
    state: RunState,
    end_state: Option<EndState>,
    trials: Vec<Trial>,
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    pub end_state: EndState,
    /// The extracted optimum; `None` when nothing was evaluated or the run
    /// ended on a precondition check.
    pub optimum: Option<Optimum>,
    /// Trials evaluated by this run, in order.
    pub trials: Vec<Trial>,
}

/// A representative best point.
///
/// For one objective this is the backend's best trial. With several
/// objectives the Pareto front stays with the backend and this is the most
/// recently evaluated point.
#[derive(Clone, Debug, PartialEq)]
pub struct Optimum {
    /// Parameter values in declared variable order.
    pub parameters: Vec<f64>,
    pub objective_values: Vec<f64>,
}

impl<B: Backend, E: Evaluator> TrialOrchestrator<B, E> {
    /// Start configuring a run over `backend` with `evaluator`.
    #[must_use]
    pub fn builder(backend: B, evaluator: E) -> TrialOrchestratorBuilder<B, E> {
        TrialOrchestratorBuilder::new(backend, evaluator)
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The terminal reason, once the run has ended.
    #[must_use]
    pub fn end_state(&self) -> Option<EndState> {
        self.end_state
    }

    /// Trials this run has evaluated so far. Still available after a fatal
    /// error, when no [`RunOutcome`] is returned.
    #[must_use]
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn objectives(&self) -> &[String] {
        &self.objectives
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the orchestrator, returning its backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }
}
