//! Parameter value storage types.

/// A value produced by a sampler for one distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    /// A floating-point parameter value.
    Float(f64),
    /// An integer parameter value.
    Int(i64),
}

impl ParamValue {
    /// The value as the `f64` the evaluator receives.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Float(v) => v,
            Self::Int(v) => v as f64,
        }
    }
}
