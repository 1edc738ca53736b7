#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the lower bound is greater than the upper bound.
    #[error("invalid bounds for '{name}': low ({low}) must be less than or equal to high ({high})")]
    InvalidBounds {
        /// The variable the bounds belong to.
        name: String,
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when a step is not positive and finite, or is fractional for
    /// an integer variable.
    #[error("invalid step for '{name}': {step}")]
    InvalidStep {
        /// The variable the step belongs to.
        name: String,
        /// The rejected step.
        step: f64,
    },

    /// Returned when a variable has an empty name.
    #[error("variable names must not be empty")]
    InvalidVariableName,

    /// Returned when two variables share a name.
    #[error("duplicate variable name '{0}'")]
    DuplicateVariable(String),

    /// Returned when a run is configured without objectives.
    #[error("at least one objective is required")]
    EmptyObjectives,

    /// Returned when the evaluator returns the wrong number of values.
    #[error("objective dimension mismatch: expected {expected} values, got {got}")]
    ObjectiveDimensionMismatch {
        /// The number of declared objectives.
        expected: usize,
        /// The number of values returned.
        got: usize,
    },

    /// Returned when the evaluator keeps producing NaN objectives.
    #[error(
        "the objective function returned NaN {attempts} times in a row; \
         the optimization was terminated, please check the objective function"
    )]
    RetryLimitExceeded {
        /// Consecutive NaN outcomes observed before giving up.
        attempts: usize,
    },

    /// Returned when the evaluator itself fails.
    #[error("evaluator error: {0}")]
    Evaluator(String),

    /// Returned when a constraint attribute value is not a number.
    #[error("constraint value '{0}' is not a number")]
    InvalidConstraint(String),

    /// Returned when the sampler/study backend rejects a call.
    #[error("backend error: {0}")]
    Backend(String),

    /// Returned when the best trial does not carry a value for a declared variable.
    #[error("best trial has no value for variable '{0}'")]
    MissingParameter(String),

    /// Returned when `run` is called on an orchestrator that already ran.
    #[error("orchestrator already ran; build a new one for the next run")]
    AlreadyStarted,

    /// Returned when the worker thread cannot be started.
    #[error("failed to spawn optimization worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    /// Returned when the worker thread running the loop panics.
    #[error("optimization worker panicked")]
    WorkerPanicked,

    /// Returned when an async task fails.
    #[cfg(feature = "async")]
    #[error("async task error: {0}")]
    TaskError(String),
}

pub type Result<T> = core::result::Result<T, Error>;
