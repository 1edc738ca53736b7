//! The evaluator seam and the NaN-retry policy wrapped around it.
//!
//! An [`Evaluator`] maps a parameter vector to objective values. Plain
//! closures implement it:
//!
//! ```
//! use trial_orchestrator::{Evaluation, Evaluator};
//!
//! let mut sphere = |p: &[f64], _progress: u32| {
//!     Ok::<_, String>(Evaluation::new(vec![p.iter().map(|v| v * v).sum()]))
//! };
//! let out = sphere.evaluate(&[1.0, 2.0], 0).unwrap();
//! assert_eq!(out.objective_values, vec![5.0]);
//! ```
//!
//! [`RetryingEvaluator`] drives one evaluator against a
//! [`Backend`](crate::backend::Backend): it suggests every variable on a
//! candidate, evaluates, and when any objective comes back NaN it abandons
//! the candidate and asks for a fresh one, up to [`MAX_NAN_RETRIES`] times.

use std::collections::HashMap;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::variable::Variable;

/// Consecutive NaN outcomes tolerated before the run is aborted.
pub const MAX_NAN_RETRIES: usize = 10;

/// A side product of an evaluation, attached to the trial for review.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Artifact {
    /// Serialized model geometry, stored as the `geometry` trial attribute.
    Geometry(String),
    /// An encoded image handed to the backend's image store.
    Image(Vec<u8>),
}

/// What an evaluator returns for one parameter vector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evaluation {
    /// One value per objective, in declared order. NaN marks a degenerate point.
    pub objective_values: Vec<f64>,
    /// Attributes to record on the trial.
    pub attributes: HashMap<String, Vec<String>>,
    /// Heavyweight side products.
    pub artifacts: Vec<Artifact>,
}

impl Evaluation {
    #[must_use]
    pub fn new(objective_values: Vec<f64>) -> Self {
        Self {
            objective_values,
            ..Self::default()
        }
    }

    /// Add a trial attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.attributes.insert(key.into(), values);
        self
    }

    /// Add an artifact.
    #[must_use]
    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    /// Returns `true` if any objective value is NaN.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.objective_values.iter().any(|v| v.is_nan())
    }
}

/// Maps a parameter vector to objective values.
///
/// Implemented for every `FnMut(&[f64], u32) -> Result<Evaluation, E>`
/// closure. The second argument is the run's progress in percent, for
/// evaluators that drive a progress display.
pub trait Evaluator {
    /// The error type returned by [`evaluate`](Evaluator::evaluate).
    type Error: ToString;

    /// Evaluate one parameter vector, given in declared variable order.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the run. Return NaN objective values instead to
    /// have the point replaced by a fresh candidate.
    fn evaluate(
        &mut self,
        parameters: &[f64],
        progress_percent: u32,
    ) -> core::result::Result<Evaluation, Self::Error>;
}

impl<F, E> Evaluator for F
where
    F: FnMut(&[f64], u32) -> core::result::Result<Evaluation, E>,
    E: ToString,
{
    type Error = E;

    fn evaluate(
        &mut self,
        parameters: &[f64],
        progress_percent: u32,
    ) -> core::result::Result<Evaluation, E> {
        self(parameters, progress_percent)
    }
}

/// A successful evaluation together with the candidate that produced it.
#[derive(Debug)]
pub struct Evaluated<C> {
    /// The candidate to tell or park. It may differ from the one passed in
    /// when NaN outcomes forced fresh candidates.
    pub candidate: C,
    /// Parameter values in declared variable order.
    pub parameters: Vec<f64>,
    /// The evaluator's output; no objective value is NaN.
    pub evaluation: Evaluation,
    /// Number of candidates abandoned on the way.
    pub nan_retries: usize,
}

/// Wraps an [`Evaluator`] with the bounded fresh-candidate retry policy.
pub struct RetryingEvaluator<E> {
    inner: E,
    objective_count: usize,
    max_nan_retries: usize,
}

impl<E: Evaluator> RetryingEvaluator<E> {
    /// Wrap `inner`, expecting `objective_count` values per evaluation.
    #[must_use]
    pub fn new(inner: E, objective_count: usize) -> Self {
        Self {
            inner,
            objective_count,
            max_nan_retries: MAX_NAN_RETRIES,
        }
    }

    /// Evaluate `candidate`, replacing it with fresh candidates while the
    /// evaluator returns NaN.
    ///
    /// Degenerate candidates are [abandoned](Backend::abandon), never told.
    ///
    /// # Errors
    ///
    /// - [`Error::RetryLimitExceeded`] after [`MAX_NAN_RETRIES`] NaN outcomes
    ///   in a row. The candidate asked after the last one is abandoned
    ///   without being evaluated.
    /// - [`Error::Evaluator`] if the evaluator fails.
    /// - [`Error::ObjectiveDimensionMismatch`] if it returns the wrong number
    ///   of values.
    /// - Any backend error.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn evaluate<B: Backend>(
        &mut self,
        backend: &mut B,
        candidate: B::Candidate,
        variables: &[Variable],
        trial_index: u64,
        progress_percent: u32,
    ) -> Result<Evaluated<B::Candidate>> {
        let mut candidate = candidate;
        let mut nan_retries = 0;

        loop {
            let parameters = suggest_all(backend, &mut candidate, variables)?;

            if nan_retries >= self.max_nan_retries {
                backend.abandon(candidate)?;
                trace_error!(trial_index, nan_retries, "NaN retry limit reached");
                return Err(Error::RetryLimitExceeded {
                    attempts: nan_retries,
                });
            }

            let evaluation = match self.inner.evaluate(&parameters, progress_percent) {
                Ok(evaluation) => evaluation,
                Err(e) => {
                    backend.abandon(candidate)?;
                    return Err(Error::Evaluator(e.to_string()));
                }
            };

            if evaluation.objective_values.len() != self.objective_count {
                backend.abandon(candidate)?;
                return Err(Error::ObjectiveDimensionMismatch {
                    expected: self.objective_count,
                    got: evaluation.objective_values.len(),
                });
            }

            if evaluation.is_degenerate() {
                nan_retries += 1;
                trace_warn!(
                    trial_index,
                    nan_retries,
                    "objective returned NaN, asking for a fresh candidate"
                );
                backend.abandon(candidate)?;
                candidate = backend.ask()?;
                continue;
            }

            return Ok(Evaluated {
                candidate,
                parameters,
                evaluation,
                nan_retries,
            });
        }
    }

    /// Consume the wrapper, returning the inner evaluator.
    #[must_use]
    pub fn into_inner(self) -> E {
        self.inner
    }
}

/// Suggest every variable on `candidate`, in declared order, snapped onto
/// the variable's grid.
pub(crate) fn suggest_all<B: Backend>(
    backend: &mut B,
    candidate: &mut B::Candidate,
    variables: &[Variable],
) -> Result<Vec<f64>> {
    variables
        .iter()
        .map(|variable| {
            backend
                .suggest(candidate, variable)
                .map(|value| variable.snap(value))
        })
        .collect()
}
