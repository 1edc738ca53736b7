//! The orchestrator's record of one ask/evaluate/tell cycle.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One proposed-and-evaluated parameter vector.
///
/// Created when a cycle starts and owned by the orchestrator until the outcome
/// is told to the backend; the backend is authoritative for the trial after
/// that. The orchestrator keeps these records for the current run so callers
/// can inspect what was evaluated.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trial {
    /// Position of the trial within the run, starting at zero.
    pub index: u64,
    /// Parameter values in declared variable order.
    pub parameters: Vec<f64>,
    /// Objective values in declared objective order; empty until evaluated.
    pub objective_values: Vec<f64>,
    /// Attributes attached before the trial was told.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: HashMap<String, Vec<String>>,
    /// When the cycle started.
    pub started_at: DateTime<Utc>,
    /// When the outcome was handed to the backend.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Trial {
    pub(crate) fn start(index: u64) -> Self {
        Self {
            index,
            parameters: Vec::new(),
            objective_values: Vec::new(),
            attributes: HashMap::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Wall-clock time between start and completion, if completed.
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }

    /// Whether the outcome has been handed to the backend.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}
