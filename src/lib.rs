#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Trial orchestration for expensive black-box optimization.
//!
//! This crate drives the ask → evaluate → tell loop between a sampler/study
//! backend and an evaluator that may take seconds per call: it proposes
//! parameter vectors, replaces degenerate (NaN) points with fresh candidates,
//! reports live progress, gates trials awaiting human review, and decides when
//! to stop. Sampling algorithms and persistence stay behind the [`Backend`]
//! trait.
//!
//! # Getting Started
//!
//! ```
//! use trial_orchestrator::prelude::*;
//!
//! let mut orchestrator = TrialOrchestrator::builder(
//!     MemoryBackend::with_sampler(RandomSampler::with_seed(42)),
//!     |p: &[f64], _progress: u32| {
//!         Ok::<_, Error>(Evaluation::new(vec![(p[0] - 3.0).powi(2) + p[1]]))
//!     },
//! )
//! .variables([Variable::float("x", -10.0, 10.0), Variable::integer("n", 0, 8).with_step(2.0)])
//! .objective("loss")
//! .config(RunConfig::new(30))
//! .build()
//! .unwrap();
//!
//! let outcome = orchestrator.run().unwrap();
//! assert_eq!(outcome.end_state, EndState::AllTrialsCompleted);
//!
//! let best = outcome.optimum.unwrap();
//! println!("x = {:.3}, n = {}, loss = {:.3}", best.parameters[0], best.parameters[1], best.objective_values[0]);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`TrialOrchestrator`] | The loop: ask, evaluate with retry, report, tell, stop. |
//! | [`Backend`] | Ask/tell interface to the optimization engine. [`MemoryBackend`] is bundled. |
//! | [`Evaluator`] | Maps a parameter vector to objective values; implemented for closures. |
//! | [`RetryingEvaluator`] | Replaces NaN outcomes with fresh candidates, at most [`MAX_NAN_RETRIES`](evaluator::MAX_NAN_RETRIES) times. |
//! | [`ConcurrencyGate`](gate::ConcurrencyGate) | Caps trials awaiting human review. |
//! | [`StopPolicy`] | Trial count, timeout and [`StopSignal`], in that order. |
//! | [`ProgressTelemetry`] | Best frontier, hypervolume ratio and ETA every cycle. |
//!
//! All objectives are minimized. Negate a value in the evaluator to maximize it.
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at run start/end, every trial, NaN retries, gate waits and aborts | on |
//! | `async` | [`TrialOrchestrator::run_async`] on the tokio blocking pool | off |
//! | `serde` | `Serialize`/`Deserialize` on configuration, variables, trials and progress snapshots | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::error!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_error {
    ($($arg:tt)*) => { tracing::error!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_error {
    ($($arg:tt)*) => {};
}

pub mod backend;
mod config;
mod distribution;
mod error;
pub mod evaluator;
pub mod gate;
mod notify;
pub mod orchestrator;
mod param;
pub mod pareto;
pub mod sampler;
mod stop;
pub mod telemetry;
mod trial;
mod types;
mod variable;

pub use backend::{Backend, MemoryBackend};
pub use config::RunConfig;
pub use distribution::{Distribution, FloatDistribution, IntDistribution};
pub use error::{Error, Result};
pub use evaluator::{Artifact, Evaluation, Evaluator, RetryingEvaluator};
pub use notify::{LogNotifier, Notifier};
pub use orchestrator::{Optimum, RunHandle, RunOutcome, TrialOrchestrator, TrialOrchestratorBuilder};
pub use param::ParamValue;
pub use stop::{StopPolicy, StopSignal};
pub use telemetry::{ProgressSink, ProgressState, ProgressTelemetry};
pub use trial::Trial;
pub use types::{EndState, GcPolicy, RunState, TrialState};
pub use variable::{MAX_INTEGER_BOUND, Variable};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use trial_orchestrator::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{Backend, MemoryBackend, TrialRecord};
    pub use crate::config::RunConfig;
    pub use crate::error::{Error, Result};
    pub use crate::evaluator::{Artifact, Evaluation, Evaluator};
    pub use crate::notify::{LogNotifier, Notifier};
    pub use crate::orchestrator::{Optimum, RunOutcome, TrialOrchestrator};
    pub use crate::sampler::{RandomSampler, Sampler};
    pub use crate::stop::StopSignal;
    pub use crate::telemetry::{ProgressSink, ProgressState};
    pub use crate::trial::Trial;
    pub use crate::types::{EndState, GcPolicy, RunState, TrialState};
    pub use crate::variable::Variable;
}
