//! Random sampler implementation.

use parking_lot::Mutex;

use crate::backend::TrialRecord;
use crate::distribution::Distribution;
use crate::param::ParamValue;
use crate::sampler::Sampler;

/// A simple random sampler that samples uniformly from distributions.
///
/// This sampler ignores the trial history and samples uniformly at random,
/// respecting step constraints.
///
/// # Examples
///
/// ```
/// use trial_orchestrator::sampler::RandomSampler;
///
/// // Create with default RNG
/// let sampler = RandomSampler::new();
///
/// // Create with a fixed seed for reproducibility
/// let sampler = RandomSampler::with_seed(42);
/// ```
pub struct RandomSampler {
    rng: Mutex<fastrand::Rng>,
}

impl RandomSampler {
    /// Creates a new random sampler with a default random seed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Creates a new random sampler with a fixed seed for reproducibility.
    ///
    /// Using the same seed will produce the same sequence of sampled values.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomSampler {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn sample(
        &self,
        distribution: &Distribution,
        _trial_number: u64,
        _history: &[TrialRecord],
    ) -> ParamValue {
        let mut rng = self.rng.lock();

        match distribution {
            Distribution::Float(d) => {
                let value = if let Some(step) = d.step {
                    // Sample from step grid
                    let n_steps = ((d.high - d.low) / step + 1e-9).floor() as i64;
                    let k = rng.i64(0..=n_steps);
                    d.low + (k as f64) * step
                } else {
                    d.low + rng.f64() * (d.high - d.low)
                };
                ParamValue::Float(value)
            }
            Distribution::Int(d) => {
                // Widened so extreme bounds cannot overflow.
                let (low, step) = (i128::from(d.low), i128::from(d.step));
                let n_steps = (i128::from(d.high) - low) / step;
                let k = rng.i128(0..=n_steps);
                ParamValue::Int((low + k * step) as i64)
            }
        }
    }
}
