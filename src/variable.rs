//! Optimized dimensions.
//!
//! A [`Variable`] describes one dimension of the search space: its bounds,
//! whether it is integer-valued, and the grid step candidates must fall on.
//! The order of variables is significant: it is the order in which parameter
//! values are handed to the evaluator.
//!
//! ```
//! use trial_orchestrator::Variable;
//!
//! let width = Variable::float("width", 0.5, 2.0).with_step(0.25);
//! let count = Variable::integer("count", 1, 9).with_step(2.0);
//!
//! assert_eq!(width.snap(1.13), 1.25);
//! assert_eq!(count.snap(4.2), 5.0);
//! ```

use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::distribution::{Distribution, FloatDistribution, IntDistribution};
use crate::error::{Error, Result};

/// Largest magnitude an integer bound may have: every integer up to it is
/// exact in `f64`, and any range between two such bounds fits an `i64`.
pub const MAX_INTEGER_BOUND: f64 = 9_007_199_254_740_992.0;

/// One optimized dimension. Immutable once a run starts.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    name: String,
    lower_bound: f64,
    upper_bound: f64,
    is_integer: bool,
    step: Option<f64>,
}

impl Variable {
    /// A continuous variable on `[low, high]`.
    #[must_use]
    pub fn float(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            lower_bound: low,
            upper_bound: high,
            is_integer: false,
            step: None,
        }
    }

    /// An integer variable on `[low, high]` with step 1.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn integer(name: impl Into<String>, low: i64, high: i64) -> Self {
        Self {
            name: name.into(),
            lower_bound: low as f64,
            upper_bound: high as f64,
            is_integer: true,
            step: Some(1.0),
        }
    }

    /// Restrict candidates to `lower_bound + k * step`.
    ///
    /// The grid is anchored at the lower bound, so `integer("n", 1, 9)` with
    /// step 2 yields odd values.
    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    #[must_use]
    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.is_integer
    }

    /// The grid step, `None` for an unstepped continuous variable.
    #[must_use]
    pub fn step(&self) -> Option<f64> {
        self.step
    }

    /// Check bounds, step and name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVariableName`] for an empty name,
    /// [`Error::InvalidBounds`] when `low > high` (or a bound of an integer
    /// variable is fractional, non-finite or beyond [`MAX_INTEGER_BOUND`]), and [`Error::InvalidStep`] when
    /// the step is not positive and finite, or is fractional for an integer
    /// variable.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidVariableName);
        }
        let bounds_ok = self.lower_bound.is_finite()
            && self.upper_bound.is_finite()
            && self.lower_bound <= self.upper_bound
            && (!self.is_integer
                || (self.lower_bound.fract() == 0.0
                    && self.upper_bound.fract() == 0.0
                    && self.lower_bound.abs() <= MAX_INTEGER_BOUND
                    && self.upper_bound.abs() <= MAX_INTEGER_BOUND));
        if !bounds_ok {
            return Err(Error::InvalidBounds {
                name: self.name.clone(),
                low: self.lower_bound,
                high: self.upper_bound,
            });
        }
        if let Some(step) = self.step
            && (!step.is_finite() || step <= 0.0 || (self.is_integer && step.fract() != 0.0))
        {
            return Err(Error::InvalidStep {
                name: self.name.clone(),
                step,
            });
        }
        Ok(())
    }

    /// The distribution a sampler should draw this variable from.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn distribution(&self) -> Distribution {
        if self.is_integer {
            Distribution::Int(IntDistribution {
                low: self.lower_bound as i64,
                high: self.upper_bound as i64,
                step: self.step.map_or(1, |s| s as i64),
            })
        } else {
            Distribution::Float(FloatDistribution {
                low: self.lower_bound,
                high: self.upper_bound,
                step: self.step,
            })
        }
    }

    /// Move `value` onto the nearest admissible point: within bounds, on the
    /// step grid, integral for integer variables.
    #[must_use]
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = if value.is_nan() {
            self.lower_bound
        } else {
            value.clamp(self.lower_bound, self.upper_bound)
        };
        let snapped = match self.step {
            Some(step) => {
                let last = ((self.upper_bound - self.lower_bound) / step + 1e-9).floor();
                let k = ((clamped - self.lower_bound) / step).round().clamp(0.0, last);
                self.lower_bound + k * step
            }
            None => clamped,
        };
        if self.is_integer {
            snapped.round()
        } else {
            snapped
        }
    }

    /// Whether `value` is an admissible candidate for this variable.
    #[must_use]
    pub fn admits(&self, value: f64) -> bool {
        let tolerance = 1e-9 * (1.0 + value.abs());
        value.is_finite()
            && value >= self.lower_bound - tolerance
            && value <= self.upper_bound + tolerance
            && (self.snap(value) - value).abs() <= tolerance
    }
}

/// Validate every variable and reject duplicate names.
///
/// # Errors
///
/// Returns the first validation error, or [`Error::DuplicateVariable`].
pub(crate) fn validate_all(variables: &[Variable]) -> Result<()> {
    let mut seen = HashSet::with_capacity(variables.len());
    for variable in variables {
        variable.validate()?;
        if !seen.insert(variable.name()) {
            return Err(Error::DuplicateVariable(variable.name().to_string()));
        }
    }
    Ok(())
}
