//! The sampler/study backend the loop drives through ask/tell.
//!
//! The [`Backend`] trait is the whole surface the orchestrator needs from a
//! black-box optimization engine: propose a candidate, suggest one value per
//! [`Variable`], accept the outcome, and expose enough history for progress
//! reporting and optimum extraction. Sampling algorithms, persistence and
//! visualization stay behind it.
//!
//! # Available backends
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`MemoryBackend`] | In-memory study behind a read-write lock, with a pluggable [`Sampler`](crate::sampler::Sampler) |
//!
//! # Implementing a custom backend
//!
//! Implement [`Backend`] for an adapter around your engine. Methods with
//! default implementations ([`park`](Backend::park),
//! [`abandon`](Backend::abandon), [`attach_images`](Backend::attach_images))
//! may be left alone when the engine has no counterpart.

mod memory;

use std::collections::HashMap;

pub use memory::{MemoryBackend, MemoryCandidate};

use crate::error::Result;
use crate::types::TrialState;
use crate::variable::Variable;

/// A trial as recorded by a backend.
///
/// Parameters are kept in the backend's own order, which need not match
/// the declared variable order; look them up by name.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialRecord {
    /// The backend's trial number.
    pub number: u64,
    /// `(variable name, value)` pairs in backend order.
    pub params: Vec<(String, f64)>,
    /// Objective values; empty until the trial is complete.
    pub values: Vec<f64>,
    /// The state of the trial.
    pub state: TrialState,
    /// Attributes recorded on the trial.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attrs: HashMap<String, Vec<String>>,
}

impl TrialRecord {
    /// The value recorded for the named variable.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<f64> {
        self.params
            .iter()
            .find_map(|(key, value)| (key == name).then_some(*value))
    }
}

/// Ask/tell interface to a stateful black-box optimization engine.
///
/// The orchestrator owns its backend and calls it from a single thread; a
/// backend that is shared with other threads (for example with a human
/// reviewer completing parked trials) must serialize its own state.
pub trait Backend {
    /// Handle for one asked-but-not-yet-told trial.
    type Candidate;

    /// Whether a study called `study_name` already exists, and if so how
    /// many objectives it was created with.
    fn existing_objective_count(&self, study_name: &str) -> Option<usize>;

    /// Create the study, or load it when it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) when the engine
    /// refuses to create or load the study.
    fn open_study(&mut self, study_name: &str, objective_names: &[String]) -> Result<()>;

    /// Propose a new candidate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) on engine failure.
    fn ask(&mut self) -> Result<Self::Candidate>;

    /// Suggest a value for one variable on `candidate`, honoring its bounds,
    /// step and integrality.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) on engine failure.
    fn suggest(&mut self, candidate: &mut Self::Candidate, variable: &Variable) -> Result<f64>;

    /// Report the objective values of `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) when the engine
    /// rejects the outcome.
    fn tell(&mut self, candidate: Self::Candidate, values: &[f64]) -> Result<()>;

    /// Leave `candidate` running for a human reviewer to complete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) on engine failure.
    fn park(&mut self, candidate: Self::Candidate) -> Result<()> {
        drop(candidate);
        Ok(())
    }

    /// Give up on `candidate` without reporting an outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) on engine failure.
    fn abandon(&mut self, candidate: Self::Candidate) -> Result<()> {
        drop(candidate);
        Ok(())
    }

    /// The current best trials: the single minimum for one objective, the
    /// Pareto front otherwise.
    fn best_trials(&self) -> Vec<TrialRecord>;

    /// Every complete trial, oldest first.
    fn completed_trials(&self) -> Vec<TrialRecord>;

    /// Number of trials asked and not yet told or abandoned.
    fn running_trial_count(&self) -> usize;

    /// Record an attribute on the study.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) on engine failure.
    fn set_study_attr(&mut self, key: &str, values: Vec<String>) -> Result<()>;

    /// Record an attribute on the trial behind `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) on engine failure.
    fn set_trial_attr(
        &mut self,
        candidate: &Self::Candidate,
        key: &str,
        values: Vec<String>,
    ) -> Result<()>;

    /// Attach encoded images for a human reviewer to the trial behind `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) on engine failure.
    fn attach_images(&mut self, candidate: &Self::Candidate, images: &[Vec<u8>]) -> Result<()> {
        let _ = (candidate, images);
        Ok(())
    }

    /// Queue a point to be proposed before any sampled one.
    ///
    /// Returns `false` when `skip_if_exists` is set and the point was already
    /// queued or evaluated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) on engine failure.
    fn enqueue(&mut self, params: &HashMap<String, f64>, skip_if_exists: bool) -> Result<bool>;
}
