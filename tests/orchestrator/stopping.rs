use std::thread;
use std::time::Duration;

use trial_orchestrator::prelude::*;

use crate::support::CountingBackend;

fn identity(p: &[f64], _: u32) -> Result<Evaluation> {
    Ok(Evaluation::new(vec![p[0]]))
}

#[test]
fn test_zero_max_trials_asks_nothing() {
    let backend = CountingBackend::new(0);
    let calls = backend.calls.clone();
    let mut orchestrator = TrialOrchestrator::builder(backend, identity)
        .variable(Variable::float("x", 0.0, 1.0))
        .objective("f")
        .config(RunConfig::new(0))
        .build()
        .unwrap();

    let outcome = orchestrator.run().unwrap();
    assert_eq!(outcome.end_state, EndState::AllTrialsCompleted);
    assert!(outcome.optimum.is_none());
    assert_eq!(calls.asks(), 0);
}

#[test]
fn test_timeout_ends_run() {
    let mut orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), |p: &[f64], _: u32| {
        thread::sleep(Duration::from_millis(20));
        Ok::<_, Error>(Evaluation::new(vec![p[0]]))
    })
    .variable(Variable::float("x", 0.0, 1.0))
    .objective("f")
    .config(RunConfig::new(10_000).with_timeout_seconds(0.1))
    .build()
    .unwrap();

    let outcome = orchestrator.run().unwrap();
    assert_eq!(outcome.end_state, EndState::Timeout);
    assert!(!outcome.trials.is_empty());
    assert!(outcome.trials.len() < 10_000);
}

#[test]
fn test_stale_stop_request_is_cleared_on_build() {
    let signal = StopSignal::new();
    signal.request_stop();

    let mut orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), identity)
        .variable(Variable::float("x", 0.0, 1.0))
        .objective("f")
        .config(RunConfig::new(3).with_stop_signal(signal))
        .build()
        .unwrap();

    let outcome = orchestrator.run().unwrap();
    assert_eq!(outcome.end_state, EndState::AllTrialsCompleted);
    assert_eq!(outcome.trials.len(), 3);
}

#[test]
fn test_stop_requested_right_after_spawn_is_honored() {
    for _ in 0..10 {
        let orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), |p: &[f64], _: u32| {
            thread::sleep(Duration::from_millis(1));
            Ok::<_, Error>(Evaluation::new(vec![p[0]]))
        })
        .variable(Variable::float("x", 0.0, 1.0))
        .objective("f")
        .config(RunConfig::new(50))
        .build()
        .unwrap();

        let handle = orchestrator.spawn().unwrap();
        handle.request_stop();

        let outcome = handle.join().unwrap();
        assert_eq!(outcome.end_state, EndState::StoppedByUser);
        assert!(outcome.trials.len() < 50);
    }
}

#[test]
fn test_stop_requested_between_build_and_run() {
    let signal = StopSignal::new();
    let mut orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), identity)
        .variable(Variable::float("x", 0.0, 1.0))
        .objective("f")
        .config(RunConfig::new(3).with_stop_signal(signal.clone()))
        .build()
        .unwrap();

    signal.request_stop();
    let outcome = orchestrator.run().unwrap();
    assert_eq!(outcome.end_state, EndState::StoppedByUser);
    assert!(outcome.trials.is_empty());
    assert!(!signal.is_requested());
}

#[test]
fn test_trial_count_takes_precedence_over_stop_request() {
    let signal = StopSignal::new();
    let remote = signal.clone();
    let mut calls = 0;

    let mut orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), move |p: &[f64], _: u32| {
        calls += 1;
        if calls == 3 {
            remote.request_stop();
        }
        Ok::<_, Error>(Evaluation::new(vec![p[0]]))
    })
    .variable(Variable::float("x", 0.0, 1.0))
    .objective("f")
    .config(RunConfig::new(3).with_stop_signal(signal.clone()))
    .build()
    .unwrap();

    let outcome = orchestrator.run().unwrap();
    assert_eq!(outcome.end_state, EndState::AllTrialsCompleted);
    // The request was not the reason to stop, so it is still pending.
    assert!(signal.is_requested());
}

#[test]
fn test_stop_from_another_thread() {
    let signal = StopSignal::new();
    let orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), |p: &[f64], _: u32| {
        thread::sleep(Duration::from_millis(5));
        Ok::<_, Error>(Evaluation::new(vec![p[0]]))
    })
    .variable(Variable::float("x", 0.0, 1.0))
    .objective("f")
    .config(RunConfig::new(u64::MAX).with_stop_signal(signal))
    .build()
    .unwrap();

    let handle = orchestrator.spawn().unwrap();
    thread::sleep(Duration::from_millis(30));
    handle.request_stop();

    let outcome = handle.join().unwrap();
    assert_eq!(outcome.end_state, EndState::StoppedByUser);
    assert!(!outcome.trials.is_empty());
}
