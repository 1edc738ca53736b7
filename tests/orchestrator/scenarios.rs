use std::collections::HashMap;

use trial_orchestrator::prelude::*;

use crate::support::CountingBackend;

#[test]
fn test_quadratic_runs_exactly_max_trials() {
    let backend = CountingBackend::new(42);
    let calls = backend.calls.clone();

    let mut orchestrator = TrialOrchestrator::builder(backend, |p: &[f64], _: u32| {
        Ok::<_, Error>(Evaluation::new(vec![p[0] * p[0]]))
    })
    .variable(Variable::float("x", -10.0, 10.0))
    .objective("f")
    .config(RunConfig::new(5))
    .build()
    .unwrap();

    let outcome = orchestrator.run().unwrap();

    assert_eq!(outcome.end_state, EndState::AllTrialsCompleted);
    assert_eq!(orchestrator.end_state(), Some(EndState::AllTrialsCompleted));
    assert_eq!(orchestrator.state(), RunState::Completed);
    assert_eq!(outcome.trials.len(), 5);
    assert_eq!(calls.asks(), 5);
    assert_eq!(calls.tells(), 5);

    let optimum = outcome.optimum.unwrap();
    for trial in &outcome.trials {
        assert!(optimum.objective_values[0] <= trial.objective_values[0]);
        assert_eq!(trial.objective_values[0], trial.parameters[0].powi(2));
    }
    assert_eq!(optimum.objective_values[0], optimum.parameters[0].powi(2));
}

#[test]
fn test_trial_numbers_are_gapless() {
    let mut orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), |p: &[f64], _: u32| {
        Ok::<_, Error>(Evaluation::new(vec![p[0]]))
    })
    .variable(Variable::float("x", 0.0, 1.0))
    .objective("f")
    .config(RunConfig::new(12))
    .build()
    .unwrap();

    let outcome = orchestrator.run().unwrap();
    let indices: Vec<u64> = outcome.trials.iter().map(|t| t.index).collect();
    assert_eq!(indices, (0..12).collect::<Vec<_>>());
    assert!(outcome.trials.iter().all(Trial::is_completed));
}

#[test]
fn test_integer_candidates_are_step_multiples_within_bounds() {
    let mut orchestrator =
        TrialOrchestrator::builder(CountingBackend::new(5), |p: &[f64], _: u32| {
            Ok::<_, Error>(Evaluation::new(vec![p[0] + p[1]]))
        })
        .variables([
            Variable::integer("n", -6, 9).with_step(3.0),
            Variable::float("w", 0.0, 1.0).with_step(0.25),
        ])
        .objective("f")
        .config(RunConfig::new(100))
        .build()
        .unwrap();

    let outcome = orchestrator.run().unwrap();
    assert_eq!(outcome.trials.len(), 100);
    for trial in &outcome.trials {
        let n = trial.parameters[0];
        assert_eq!(n.fract(), 0.0);
        assert!((-6.0..=9.0).contains(&n));
        assert_eq!((n + 6.0) % 3.0, 0.0, "{n} is not on the grid");

        let w = trial.parameters[1];
        assert!((0.0..=1.0).contains(&w));
        assert!(((w / 0.25).round() * 0.25 - w).abs() < 1e-12);
    }
}

#[test]
fn test_stop_requested_during_second_cycle() {
    let signal = StopSignal::new();
    let remote = signal.clone();
    let mut calls = 0;

    let mut orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), move |p: &[f64], _: u32| {
        calls += 1;
        if calls == 2 {
            remote.request_stop();
        }
        Ok::<_, Error>(Evaluation::new(vec![p[0]]))
    })
    .variable(Variable::float("x", 0.0, 1.0))
    .objective("f")
    .config(RunConfig::new(1000).with_stop_signal(signal.clone()))
    .build()
    .unwrap();

    let outcome = orchestrator.run().unwrap();
    assert_eq!(outcome.end_state, EndState::StoppedByUser);
    assert_eq!(outcome.trials.len(), 2);
    assert!(!signal.is_requested());
}

#[test]
fn test_multi_objective_optimum_is_last_evaluated_point() {
    let mut orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), |p: &[f64], _: u32| {
        Ok::<_, Error>(Evaluation::new(vec![p[0], 1.0 - p[0]]))
    })
    .variable(Variable::float("x", 0.0, 1.0))
    .objectives(["f1", "f2"])
    .config(RunConfig::new(8))
    .build()
    .unwrap();

    let outcome = orchestrator.run().unwrap();
    let last = outcome.trials.last().unwrap();
    let optimum = outcome.optimum.unwrap();
    assert_eq!(optimum.parameters, last.parameters);
    assert_eq!(optimum.objective_values, last.objective_values);
}

#[test]
fn test_seed_points_evaluated_first_in_order() {
    let backend = MemoryBackend::new();
    let observer = backend.clone();
    let seed = |x: f64, y: f64| HashMap::from([("x".to_string(), x), ("y".to_string(), y)]);

    let mut orchestrator = TrialOrchestrator::builder(backend, |p: &[f64], _: u32| {
        Ok::<_, Error>(Evaluation::new(vec![p[0] + p[1]]))
    })
    .variables([Variable::float("x", 0.0, 10.0), Variable::integer("y", 0, 10)])
    .objective("f")
    .config(RunConfig::new(2))
    .enqueue(seed(4.0, 7.0))
    .enqueue(seed(1.5, 2.0))
    .enqueue(seed(4.0, 7.0))
    .build()
    .unwrap();

    let outcome = orchestrator.run().unwrap();
    assert_eq!(outcome.trials[0].parameters, vec![4.0, 7.0]);
    assert_eq!(outcome.trials[1].parameters, vec![1.5, 2.0]);
    // The duplicate was never queued.
    assert_eq!(observer.n_enqueued(), 0);
}

#[test]
fn test_orchestrator_runs_once() {
    let mut orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), |p: &[f64], _: u32| {
        Ok::<_, Error>(Evaluation::new(vec![p[0]]))
    })
    .variable(Variable::float("x", 0.0, 1.0))
    .objective("f")
    .config(RunConfig::new(1))
    .build()
    .unwrap();

    orchestrator.run().unwrap();
    assert!(matches!(orchestrator.run(), Err(Error::AlreadyStarted)));
}

#[test]
fn test_spawned_run_on_worker_thread() {
    let orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), |p: &[f64], _: u32| {
        assert_eq!(
            std::thread::current().name(),
            Some("optimize-worker-study")
        );
        Ok::<_, Error>(Evaluation::new(vec![p[0]]))
    })
    .variable(Variable::float("x", 0.0, 1.0))
    .objective("f")
    .config(RunConfig::new(3).with_study_name("worker-study"))
    .build()
    .unwrap();

    let outcome = orchestrator.spawn().unwrap().join().unwrap();
    assert_eq!(outcome.end_state, EndState::AllTrialsCompleted);
    assert_eq!(outcome.trials.len(), 3);
}

#[test]
fn test_builder_rejects_invalid_declarations() {
    let evaluator = |_: &[f64], _: u32| Ok::<_, Error>(Evaluation::new(vec![0.0]));

    let no_objectives = TrialOrchestrator::builder(MemoryBackend::new(), evaluator)
        .variable(Variable::float("x", 0.0, 1.0))
        .build();
    assert!(matches!(no_objectives, Err(Error::EmptyObjectives)));

    let duplicate = TrialOrchestrator::builder(MemoryBackend::new(), evaluator)
        .variables([Variable::float("x", 0.0, 1.0), Variable::float("x", 0.0, 2.0)])
        .objective("f")
        .build();
    assert!(matches!(duplicate, Err(Error::DuplicateVariable(_))));

    let bounds = TrialOrchestrator::builder(MemoryBackend::new(), evaluator)
        .variable(Variable::float("x", 1.0, 0.0))
        .objective("f")
        .build();
    assert!(matches!(bounds, Err(Error::InvalidBounds { .. })));
}
