use std::sync::{Arc, Mutex};

use trial_orchestrator::prelude::*;

use crate::support::CountingBackend;

fn recording_notifier() -> (impl Notifier + Send + 'static, Arc<Mutex<Vec<String>>>) {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&messages);
    let notifier = move |m: &str| sink.lock().unwrap().push(m.to_string());
    (notifier, messages)
}

#[test]
fn test_always_nan_aborts_after_eleventh_ask() {
    let backend = CountingBackend::new(1);
    let calls = backend.calls.clone();
    let observer = backend.inner.clone();
    let (notifier, messages) = recording_notifier();

    let mut orchestrator = TrialOrchestrator::builder(backend, |_: &[f64], _: u32| {
        Ok::<_, Error>(Evaluation::new(vec![f64::NAN]))
    })
    .variable(Variable::float("x", -1.0, 1.0))
    .objective("f")
    .config(RunConfig::new(50))
    .notifier(notifier)
    .build()
    .unwrap();

    let err = orchestrator.run().unwrap_err();
    assert!(matches!(err, Error::RetryLimitExceeded { attempts: 10 }));
    assert_eq!(orchestrator.end_state(), Some(EndState::Error));
    assert_eq!(orchestrator.state(), RunState::Aborted);

    assert_eq!(calls.asks(), 11);
    assert_eq!(calls.tells(), 0);
    assert_eq!(calls.abandons(), 11);
    assert_eq!(observer.count(TrialState::Complete), 0);

    let messages = messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("NaN 10 times"));
}

#[test]
fn test_intermittent_nan_recovers_with_fresh_candidates() {
    let backend = CountingBackend::new(2);
    let calls = backend.calls.clone();
    let mut evaluations = 0;

    let mut orchestrator = TrialOrchestrator::builder(backend, move |p: &[f64], _: u32| {
        evaluations += 1;
        let value = if evaluations % 3 == 0 { f64::NAN } else { p[0] };
        Ok::<_, Error>(Evaluation::new(vec![value]))
    })
    .variable(Variable::float("x", -1.0, 1.0))
    .objective("f")
    .config(RunConfig::new(6))
    .build()
    .unwrap();

    let outcome = orchestrator.run().unwrap();
    assert_eq!(outcome.end_state, EndState::AllTrialsCompleted);
    assert_eq!(outcome.trials.len(), 6);
    assert_eq!(calls.tells(), 6);
    assert_eq!(calls.abandons(), calls.asks() - 6);
    assert!(outcome.trials.iter().all(|t| !t.objective_values[0].is_nan()));
}

#[test]
fn test_evaluator_error_aborts_run() {
    let (notifier, messages) = recording_notifier();
    let mut orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), |_: &[f64], _: u32| {
        Err::<Evaluation, _>("solver diverged")
    })
    .variable(Variable::float("x", -1.0, 1.0))
    .objective("f")
    .config(RunConfig::new(5))
    .notifier(notifier)
    .build()
    .unwrap();

    let err = orchestrator.run().unwrap_err();
    assert!(matches!(&err, Error::Evaluator(msg) if msg == "solver diverged"));
    assert_eq!(orchestrator.end_state(), Some(EndState::Error));
    assert_eq!(messages.lock().unwrap().as_slice(), [err.to_string()]);
}

#[test]
fn test_wrong_objective_count_aborts_run() {
    let mut orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), |_: &[f64], _: u32| {
        Ok::<_, Error>(Evaluation::new(vec![1.0]))
    })
    .variable(Variable::float("x", -1.0, 1.0))
    .objectives(["a", "b"])
    .config(RunConfig::new(5))
    .notifier(|_: &str| {})
    .build()
    .unwrap();

    assert!(matches!(
        orchestrator.run(),
        Err(Error::ObjectiveDimensionMismatch {
            expected: 2,
            got: 1
        })
    ));
    assert_eq!(orchestrator.state(), RunState::Aborted);
}
