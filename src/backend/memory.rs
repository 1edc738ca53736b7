use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Backend, TrialRecord};
use crate::error::{Error, Result};
use crate::pareto;
use crate::sampler::{RandomSampler, Sampler};
use crate::types::TrialState;
use crate::variable::Variable;

/// In-memory study backend.
///
/// Clones share the same study, so a reviewer thread can hold a clone and
/// [`complete`](Self::complete) trials the orchestrator parked for human
/// review while the loop keeps running.
///
/// # Examples
///
/// ```
/// use trial_orchestrator::backend::{Backend, MemoryBackend};
/// use trial_orchestrator::sampler::RandomSampler;
/// use trial_orchestrator::Variable;
///
/// let mut backend = MemoryBackend::with_sampler(RandomSampler::with_seed(1));
/// backend.open_study("demo", &["f".to_string()]).unwrap();
///
/// let x = Variable::float("x", -1.0, 1.0);
/// let mut candidate = backend.ask().unwrap();
/// let value = backend.suggest(&mut candidate, &x).unwrap();
/// backend.tell(candidate, &[value * value]).unwrap();
///
/// assert_eq!(backend.completed_trials().len(), 1);
/// ```
#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<RwLock<StudyState>>,
    sampler: Arc<dyn Sampler>,
}

#[derive(Default)]
struct StudyState {
    name: Option<String>,
    objective_count: Option<usize>,
    trials: Vec<TrialRecord>,
    queue: VecDeque<HashMap<String, f64>>,
    study_attrs: HashMap<String, Vec<String>>,
    images: HashMap<u64, Vec<Vec<u8>>>,
}

/// A trial asked from a [`MemoryBackend`].
#[derive(Debug)]
pub struct MemoryCandidate {
    number: u64,
    fixed: Option<HashMap<String, f64>>,
}

impl MemoryCandidate {
    /// The backend's trial number.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }
}

impl MemoryBackend {
    /// An empty backend sampling uniformly at random.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sampler(RandomSampler::new())
    }

    /// An empty backend using `sampler` for every suggestion.
    #[must_use]
    pub fn with_sampler(sampler: impl Sampler + 'static) -> Self {
        Self {
            state: Arc::new(RwLock::new(StudyState::default())),
            sampler: Arc::new(sampler),
        }
    }

    /// A backend that already holds a study, as if loaded from storage.
    ///
    /// Trial numbers are reassigned in order so they stay gapless. A
    /// complete trial whose values do not fit `objective_count` or contain
    /// NaN is loaded as [`TrialState::Failed`].
    #[must_use]
    pub fn with_existing_study(
        sampler: impl Sampler + 'static,
        study_name: impl Into<String>,
        objective_count: usize,
        trials: Vec<TrialRecord>,
    ) -> Self {
        let trials = trials
            .into_iter()
            .enumerate()
            .map(|(i, mut t)| {
                t.number = i as u64;
                if t.state == TrialState::Complete
                    && (t.values.len() != objective_count || t.values.iter().any(|v| v.is_nan()))
                {
                    trace_warn!(
                        trial = t.number,
                        values = ?t.values,
                        "malformed complete trial loaded as failed"
                    );
                    t.state = TrialState::Failed;
                    t.values.clear();
                }
                t
            })
            .collect();
        Self {
            state: Arc::new(RwLock::new(StudyState {
                name: Some(study_name.into()),
                objective_count: Some(objective_count),
                trials,
                ..StudyState::default()
            })),
            sampler: Arc::new(sampler),
        }
    }

    /// Every trial recorded so far, in trial-number order.
    #[must_use]
    pub fn trials(&self) -> Vec<TrialRecord> {
        self.state.read().trials.clone()
    }

    /// Number of trials in the given state.
    #[must_use]
    pub fn count(&self, state: TrialState) -> usize {
        self.state
            .read()
            .trials
            .iter()
            .filter(|t| t.state == state)
            .count()
    }

    /// A study attribute, if set.
    #[must_use]
    pub fn study_attr(&self, key: &str) -> Option<Vec<String>> {
        self.state.read().study_attrs.get(key).cloned()
    }

    /// Images attached to a trial for review.
    #[must_use]
    pub fn images(&self, number: u64) -> Vec<Vec<u8>> {
        self.state
            .read()
            .images
            .get(&number)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of points still waiting in the enqueue queue.
    #[must_use]
    pub fn n_enqueued(&self) -> usize {
        self.state.read().queue.len()
    }

    /// Complete a running trial, typically one parked for human review.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the trial does not exist, is not
    /// running, or `values` does not fit the study.
    pub fn complete(&self, number: u64, values: &[f64]) -> Result<()> {
        let mut state = self.state.write();
        state.check_values(values)?;
        let trial = state.running_trial_mut(number)?;
        trial.values = values.to_vec();
        trial.state = TrialState::Complete;
        Ok(())
    }

    /// Mark a running trial as failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the trial does not exist or is not running.
    pub fn fail(&self, number: u64) -> Result<()> {
        let mut state = self.state.write();
        state.running_trial_mut(number)?.state = TrialState::Failed;
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyState {
    #[allow(clippy::cast_possible_truncation)]
    fn running_trial_mut(&mut self, number: u64) -> Result<&mut TrialRecord> {
        let trial = self
            .trials
            .get_mut(number as usize)
            .ok_or_else(|| Error::Backend(format!("unknown trial {number}")))?;
        if trial.state != TrialState::Running {
            return Err(Error::Backend(format!(
                "trial {number} is {:?}, not running",
                trial.state
            )));
        }
        Ok(trial)
    }

    fn check_values(&self, values: &[f64]) -> Result<()> {
        if let Some(expected) = self.objective_count
            && values.len() != expected
        {
            return Err(Error::Backend(format!(
                "expected {expected} objective values, got {}",
                values.len()
            )));
        }
        if values.iter().any(|v| v.is_nan()) {
            return Err(Error::Backend("objective values must not be NaN".into()));
        }
        Ok(())
    }

    fn is_known_point(&self, params: &HashMap<String, f64>) -> bool {
        let same = |other: &HashMap<String, f64>| other == params;
        self.queue.iter().any(same)
            || self.trials.iter().any(|t| {
                t.params.len() == params.len()
                    && t.params.iter().all(|(k, v)| params.get(k) == Some(v))
            })
    }
}

impl Backend for MemoryBackend {
    type Candidate = MemoryCandidate;

    fn existing_objective_count(&self, study_name: &str) -> Option<usize> {
        let state = self.state.read();
        match &state.name {
            Some(name) if name == study_name => state.objective_count,
            _ => None,
        }
    }

    fn open_study(&mut self, study_name: &str, objective_names: &[String]) -> Result<()> {
        let mut state = self.state.write();
        match &state.name {
            Some(name) if name != study_name => Err(Error::Backend(format!(
                "backend already holds study '{name}'"
            ))),
            Some(_) => Ok(()),
            None => {
                state.name = Some(study_name.to_string());
                state.objective_count = Some(objective_names.len());
                Ok(())
            }
        }
    }

    fn ask(&mut self) -> Result<MemoryCandidate> {
        let mut state = self.state.write();
        let number = state.trials.len() as u64;
        state.trials.push(TrialRecord {
            number,
            params: Vec::new(),
            values: Vec::new(),
            state: TrialState::Running,
            attrs: HashMap::new(),
        });
        let fixed = state.queue.pop_front();
        Ok(MemoryCandidate { number, fixed })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn suggest(&mut self, candidate: &mut MemoryCandidate, variable: &Variable) -> Result<f64> {
        let mut state = self.state.write();
        let index = candidate.number as usize;
        let trial = state
            .trials
            .get(index)
            .ok_or_else(|| Error::Backend(format!("unknown trial {}", candidate.number)))?;
        if let Some(value) = trial.param(variable.name()) {
            return Ok(value);
        }

        let fixed = candidate
            .fixed
            .as_ref()
            .and_then(|fixed| fixed.get(variable.name()).copied());
        let value = match fixed {
            Some(v) => variable.snap(v),
            None => {
                let sampled =
                    self.sampler
                        .sample(&variable.distribution(), candidate.number, &state.trials);
                sampled.as_f64()
            }
        };

        state.trials[index]
            .params
            .push((variable.name().to_string(), value));
        Ok(value)
    }

    fn tell(&mut self, candidate: MemoryCandidate, values: &[f64]) -> Result<()> {
        self.complete(candidate.number, values)
    }

    fn abandon(&mut self, candidate: MemoryCandidate) -> Result<()> {
        self.fail(candidate.number)
    }

    fn best_trials(&self) -> Vec<TrialRecord> {
        let state = self.state.read();
        let complete: Vec<&TrialRecord> = state
            .trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .collect();

        if state.objective_count == Some(1) {
            return complete
                .into_iter()
                .filter_map(|t| t.values.first().map(|&v| (v, t)))
                .reduce(|best, cur| if cur.0 < best.0 { cur } else { best })
                .map(|(_, t)| t.clone())
                .into_iter()
                .collect();
        }

        let values: Vec<Vec<f64>> = complete.iter().map(|t| t.values.clone()).collect();
        pareto::pareto_front_indices(&values)
            .into_iter()
            .map(|i| complete[i].clone())
            .collect()
    }

    fn completed_trials(&self) -> Vec<TrialRecord> {
        self.state
            .read()
            .trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .cloned()
            .collect()
    }

    fn running_trial_count(&self) -> usize {
        self.count(TrialState::Running)
    }

    fn set_study_attr(&mut self, key: &str, values: Vec<String>) -> Result<()> {
        self.state.write().study_attrs.insert(key.to_string(), values);
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn set_trial_attr(
        &mut self,
        candidate: &MemoryCandidate,
        key: &str,
        values: Vec<String>,
    ) -> Result<()> {
        let mut state = self.state.write();
        let trial = state
            .trials
            .get_mut(candidate.number as usize)
            .ok_or_else(|| Error::Backend(format!("unknown trial {}", candidate.number)))?;
        trial.attrs.insert(key.to_string(), values);
        Ok(())
    }

    fn attach_images(&mut self, candidate: &MemoryCandidate, images: &[Vec<u8>]) -> Result<()> {
        self.state
            .write()
            .images
            .entry(candidate.number)
            .or_default()
            .extend(images.iter().cloned());
        Ok(())
    }

    fn enqueue(&mut self, params: &HashMap<String, f64>, skip_if_exists: bool) -> Result<bool> {
        let mut state = self.state.write();
        if skip_if_exists && state.is_known_point(params) {
            return Ok(false);
        }
        state.queue.push_back(params.clone());
        Ok(true)
    }
}
