//! Sampler trait used by [`MemoryBackend`](crate::backend::MemoryBackend).
//!
//! The orchestration loop never talks to a sampler directly: it only sees the
//! [`Backend`](crate::backend::Backend) ask/tell surface. Samplers are the
//! seam inside the bundled in-memory backend where a search strategy plugs in.

pub mod random;

pub use random::RandomSampler;

use crate::backend::TrialRecord;
use crate::distribution::Distribution;
use crate::param::ParamValue;

/// Trait for pluggable parameter sampling strategies.
///
/// Samplers are responsible for generating parameter values based on
/// the distribution and historical trial data. The trait requires
/// `Send + Sync` so a backend holding one can move to the worker thread.
pub trait Sampler: Send + Sync {
    /// Samples a parameter value from the given distribution.
    ///
    /// # Arguments
    ///
    /// * `distribution` - The distribution to sample from.
    /// * `trial_number` - The number of the trial being sampled for.
    /// * `history` - Every trial recorded so far, oldest first. Only
    ///   [`Complete`](crate::types::TrialState::Complete) ones carry values.
    fn sample(
        &self,
        distribution: &Distribution,
        trial_number: u64,
        history: &[TrialRecord],
    ) -> ParamValue;
}
