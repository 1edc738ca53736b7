use std::collections::HashMap;

use trial_orchestrator::backend::TrialRecord;
use trial_orchestrator::prelude::*;
use trial_orchestrator::orchestrator::{OBJECTIVE_NAMES_ATTR, VARIABLE_NAMES_ATTR, VERSION_ATTR};

fn identity(p: &[f64], _: u32) -> Result<Evaluation> {
    Ok(Evaluation::new(vec![p[0]]))
}

fn record(number: u64, params: &[(&str, f64)], value: f64) -> TrialRecord {
    TrialRecord {
        number,
        params: params.iter().map(|(k, v)| ((*k).to_string(), *v)).collect(),
        values: vec![value],
        state: TrialState::Complete,
        attrs: HashMap::new(),
    }
}

fn existing(objectives: usize, trials: Vec<TrialRecord>) -> MemoryBackend {
    MemoryBackend::with_existing_study(RandomSampler::with_seed(0), "study1", objectives, trials)
}

#[test]
fn test_existing_study_without_continue() {
    let backend = existing(1, Vec::new());
    let observer = backend.clone();
    let mut orchestrator = TrialOrchestrator::builder(backend, identity)
        .variable(Variable::float("x", 0.0, 1.0))
        .objective("f")
        .config(RunConfig::new(10))
        .build()
        .unwrap();

    let outcome = orchestrator.run().unwrap();
    assert_eq!(outcome.end_state, EndState::ContinuePreconditionFailed);
    assert_eq!(orchestrator.state(), RunState::Completed);
    assert!(outcome.optimum.is_none());
    assert!(observer.trials().is_empty());
}

#[test]
fn test_existing_study_with_other_objective_count() {
    let backend = existing(2, Vec::new());
    let observer = backend.clone();
    let mut orchestrator = TrialOrchestrator::builder(backend, identity)
        .variable(Variable::float("x", 0.0, 1.0))
        .objective("f")
        .config(RunConfig::new(10).with_continue_study(true))
        .build()
        .unwrap();

    let outcome = orchestrator.run().unwrap();
    assert_eq!(outcome.end_state, EndState::DirectionCountMismatch);
    assert!(observer.trials().is_empty());
}

#[test]
fn test_optimum_matches_parameters_by_name() {
    // The backend stores parameters as [y, x]; the caller declared [x, y].
    let backend = existing(
        1,
        vec![
            record(0, &[("y", 9.0), ("x", 8.0)], 4.0),
            record(1, &[("y", 2.0), ("x", 1.0)], 0.5),
        ],
    );
    let mut orchestrator = TrialOrchestrator::builder(backend, identity)
        .variables([Variable::float("x", 0.0, 10.0), Variable::float("y", 0.0, 10.0)])
        .objective("f")
        .config(RunConfig::new(0).with_continue_study(true))
        .build()
        .unwrap();

    let optimum = orchestrator.run().unwrap().optimum.unwrap();
    assert_eq!(optimum.parameters, vec![1.0, 2.0]);
    assert_eq!(optimum.objective_values, vec![0.5]);
}

#[test]
fn test_best_trial_missing_a_variable_is_fatal() {
    let backend = existing(1, vec![record(0, &[("x", 1.0)], 0.5)]);
    let mut orchestrator = TrialOrchestrator::builder(backend, identity)
        .variables([Variable::float("x", 0.0, 10.0), Variable::float("y", 0.0, 10.0)])
        .objective("f")
        .config(RunConfig::new(0).with_continue_study(true))
        .notifier(|_: &str| {})
        .build()
        .unwrap();

    assert!(matches!(
        orchestrator.run(),
        Err(Error::MissingParameter(name)) if name == "y"
    ));
    assert_eq!(orchestrator.end_state(), Some(EndState::Error));
}

#[test]
fn test_continued_study_skips_known_seeds_and_records_attributes() {
    let backend = existing(1, vec![record(0, &[("x", 0.25)], 0.25)]);
    let observer = backend.clone();
    let mut orchestrator = TrialOrchestrator::builder(backend, identity)
        .variable(Variable::float("x", 0.0, 1.0))
        .objective("f")
        .config(RunConfig::new(0).with_continue_study(true))
        .enqueue(HashMap::from([("x".to_string(), 0.25)]))
        .enqueue(HashMap::from([("x".to_string(), 0.75)]))
        .build()
        .unwrap();

    orchestrator.run().unwrap();
    assert_eq!(observer.n_enqueued(), 1);
    assert_eq!(
        observer.study_attr(VARIABLE_NAMES_ATTR),
        Some(vec!["x".to_string()])
    );
    assert_eq!(
        observer.study_attr(OBJECTIVE_NAMES_ATTR),
        Some(vec!["f".to_string()])
    );
    assert_eq!(
        observer.study_attr(VERSION_ATTR),
        Some(vec![env!("CARGO_PKG_VERSION").to_string()])
    );
}

#[test]
fn test_continued_study_tolerates_trials_without_values() {
    let mut broken = record(0, &[("x", 0.1)], 0.0);
    broken.values.clear();
    let backend = existing(1, vec![broken, record(1, &[("x", 0.4)], 0.4)]);
    let (tx, rx) = std::sync::mpsc::channel();

    let mut orchestrator = TrialOrchestrator::builder(backend, |_: &[f64], _: u32| {
        Ok::<_, Error>(Evaluation::new(vec![1.0]))
    })
    .variable(Variable::float("x", 0.0, 1.0))
    .objective("f")
    .config(
        RunConfig::new(2)
            .with_continue_study(true)
            .with_realtime_progress(true),
    )
    .progress_sink(tx)
    .build()
    .unwrap();

    let outcome = orchestrator.run().unwrap();
    drop(orchestrator);
    assert_eq!(outcome.end_state, EndState::AllTrialsCompleted);
    let optimum = outcome.optimum.unwrap();
    assert_eq!(optimum.parameters, vec![0.4]);
    assert_eq!(optimum.objective_values, vec![0.4]);
    assert_eq!(rx.iter().count(), 2);
}
