use crate::backend::{Backend, TrialRecord};
use crate::error::{Error, Result};
use crate::evaluator::Evaluator;
use crate::variable::Variable;

use super::{Optimum, TrialOrchestrator};

impl<B: Backend, E: Evaluator> TrialOrchestrator<B, E> {
    /// The optimum after the loop ended normally.
    pub(super) fn extract_optimum(&self) -> Result<Option<Optimum>> {
        if self.objectives.len() > 1 {
            return Ok(self.trials.last().map(|t| Optimum {
                parameters: t.parameters.clone(),
                objective_values: t.objective_values.clone(),
            }));
        }

        let Some(best) = self.backend.best_trials().into_iter().next() else {
            return Ok(None);
        };
        let parameters = reorder_by_name(&best, &self.variables)?;
        Ok(Some(Optimum {
            parameters,
            objective_values: best.values,
        }))
    }
}

/// A trial's parameters in declared variable order.
///
/// Backends may keep parameters in any order, so values are matched by
/// variable name.
///
/// # Errors
///
/// Returns [`Error::MissingParameter`] if the trial has no value for one of
/// the variables.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
///
/// use trial_orchestrator::backend::TrialRecord;
/// use trial_orchestrator::orchestrator::reorder_by_name;
/// use trial_orchestrator::{TrialState, Variable};
///
/// let record = TrialRecord {
///     number: 0,
///     params: vec![("y".into(), 2.0), ("x".into(), 1.0)],
///     values: vec![5.0],
///     state: TrialState::Complete,
///     attrs: HashMap::new(),
/// };
/// let vars = [Variable::float("x", 0.0, 3.0), Variable::float("y", 0.0, 3.0)];
/// assert_eq!(reorder_by_name(&record, &vars).unwrap(), vec![1.0, 2.0]);
/// ```
pub fn reorder_by_name(record: &TrialRecord, variables: &[Variable]) -> Result<Vec<f64>> {
    variables
        .iter()
        .map(|v| {
            record
                .param(v.name())
                .ok_or_else(|| Error::MissingParameter(v.name().to_string()))
        })
        .collect()
}
