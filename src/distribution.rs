//! Sampling distributions derived from [`Variable`](crate::Variable)s.

/// Distribution for continuous variables.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatDistribution {
    /// Lower bound (inclusive).
    pub low: f64,
    /// Upper bound (inclusive).
    pub high: f64,
    /// Optional step size for discretization, anchored at `low`.
    pub step: Option<f64>,
}

/// Distribution for integer variables.
#[derive(Clone, Debug, PartialEq)]
pub struct IntDistribution {
    /// Lower bound (inclusive).
    pub low: i64,
    /// Upper bound (inclusive).
    pub high: i64,
    /// Step size, anchored at `low`.
    pub step: i64,
}

/// Enum wrapping all distribution types a backend may be asked to sample.
#[derive(Clone, Debug, PartialEq)]
pub enum Distribution {
    /// A floating-point distribution.
    Float(FloatDistribution),
    /// An integer distribution.
    Int(IntDistribution),
}

impl Distribution {
    /// Number of grid points, or `None` for an unstepped float range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn grid_len(&self) -> Option<u64> {
        match self {
            Self::Float(d) => d
                .step
                .map(|step| ((d.high - d.low) / step + 1e-9).floor() as u64 + 1),
            Self::Int(d) => {
                Some((d.high.abs_diff(d.low) / d.step.unsigned_abs()).saturating_add(1))
            }
        }
    }
}
