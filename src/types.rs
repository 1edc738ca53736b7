//! Core enums shared by the loop and its collaborators.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why a run ended. Recorded exactly once, when the loop terminates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EndState {
    /// The configured number of trials was reached.
    AllTrialsCompleted,
    /// The wall-clock timeout elapsed.
    Timeout,
    /// A stop was requested through the shared stop signal.
    StoppedByUser,
    /// The existing study was created with a different number of objectives.
    DirectionCountMismatch,
    /// A study with this name exists but continuing it was not allowed.
    ContinuePreconditionFailed,
    /// The run aborted on a fatal error.
    Error,
}

impl EndState {
    /// Returns `true` for end states produced by the stop policy.
    #[must_use]
    pub fn is_normal_stop(self) -> bool {
        matches!(
            self,
            Self::AllTrialsCompleted | Self::Timeout | Self::StoppedByUser
        )
    }
}

/// Lifecycle of a [`TrialOrchestrator`](crate::TrialOrchestrator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Configured, not started.
    Idle,
    /// The loop is executing cycles.
    Running,
    /// The loop ended through the stop policy or a precondition check.
    Completed,
    /// The loop ended on a fatal error.
    Aborted,
}

/// The state of a trial as recorded by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrialState {
    /// Asked but not yet told; includes trials waiting for human review.
    Running,
    /// Told with a full set of objective values.
    Complete,
    /// Abandoned without a usable result.
    Failed,
}

/// When to invoke the resource-reclamation hook after a trial.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GcPolicy {
    /// After every trial.
    Always,
    /// Only after trials whose evaluation produced artifacts.
    #[default]
    HasArtifacts,
    /// Never.
    Never,
}

impl GcPolicy {
    /// Whether the hook should run for a trial that did or did not produce artifacts.
    #[must_use]
    pub fn should_reclaim(self, has_artifacts: bool) -> bool {
        match self {
            Self::Always => true,
            Self::HasArtifacts => has_artifacts,
            Self::Never => false,
        }
    }
}
