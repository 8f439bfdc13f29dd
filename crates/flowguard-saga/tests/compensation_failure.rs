//! Integration tests for compensation failure scenarios.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use flowguard_saga::{Saga, SagaError, SagaOptions};
use flowguard_scope::Scope;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TestError(String);

type Log = Arc<Mutex<Vec<&'static str>>>;

fn entries(log: &Log) -> Vec<&'static str> {
    log.lock().expect("log lock poisoned").clone()
}

/// Registers a compensation that records its name, waits `delay` and then
/// fails if `fails` is set.
fn register(
    saga: &mut Saga<TestError>,
    log: &Log,
    name: &'static str,
    delay: Duration,
    fails: bool,
) {
    let log = Arc::clone(log);
    saga.add_compensation(name, move |_scope| {
        let log = Arc::clone(&log);
        async move {
            tokio::time::sleep(delay).await;
            log.lock().expect("log lock poisoned").push(name);
            if fails {
                Err(TestError(format!("{name} failed")))
            } else {
                Ok(())
            }
        }
    });
}

#[tokio::test]
async fn sequential_stops_at_first_failure() {
    let log = Log::default();
    let mut saga = Saga::new(&Scope::new(), SagaOptions::sequential());
    register(&mut saga, &log, "op1", Duration::ZERO, false);
    register(&mut saga, &log, "op2", Duration::ZERO, true);
    register(&mut saga, &log, "op3", Duration::ZERO, false);
    register(&mut saga, &log, "op4", Duration::ZERO, false);

    let result = saga.compensate().await;

    assert_eq!(entries(&log), vec!["op4", "op3", "op2"]);
    match result {
        Err(SagaError::StepFailed { step, source }) => {
            assert_eq!(step, "op2");
            assert_eq!(source.to_string(), "op2 failed");
        }
        other => panic!("expected StepFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn sequential_with_continue_runs_every_compensation() -> anyhow::Result<()> {
    let log = Log::default();
    let options = SagaOptions::sequential().with_continue_with_error(true);
    let mut saga = Saga::new(&Scope::new(), options);
    register(&mut saga, &log, "op1", Duration::ZERO, true);
    register(&mut saga, &log, "op2", Duration::ZERO, false);
    register(&mut saga, &log, "op3", Duration::ZERO, true);

    saga.compensate().await?;

    assert_eq!(entries(&log), vec!["op3", "op2", "op1"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn parallel_runs_all_and_collects_failures_in_registration_order() {
    let log = Log::default();
    let mut saga = Saga::new(&Scope::new(), SagaOptions::parallel());
    register(&mut saga, &log, "slow", Duration::from_secs(3), true);
    register(&mut saga, &log, "ok", Duration::from_secs(2), false);
    register(&mut saga, &log, "fast", Duration::from_secs(1), true);

    let result = saga.compensate().await;

    assert_eq!(entries(&log), vec!["fast", "ok", "slow"]);
    let Err(SagaError::Compensation(error)) = result else {
        panic!("expected aggregated compensation error");
    };
    let steps: Vec<&str> = error.failures().iter().map(|f| f.step.as_str()).collect();
    assert_eq!(steps, vec!["slow", "fast"]);
    assert_eq!(
        error.to_string(),
        "error(s) in saga compensation: slow failed; fast failed"
    );
}

#[tokio::test(start_paused = true)]
async fn parallel_compensations_overlap_in_time() -> anyhow::Result<()> {
    let log = Log::default();
    let mut saga = Saga::new(&Scope::new(), SagaOptions::parallel());
    for name in ["a", "b", "c"] {
        register(&mut saga, &log, name, Duration::from_secs(10), false);
    }
    let started = tokio::time::Instant::now();

    saga.compensate().await?;

    assert_eq!(started.elapsed(), Duration::from_secs(10));
    assert_eq!(entries(&log).len(), 3);
    Ok(())
}

#[tokio::test]
async fn parallel_ignores_continue_with_error() {
    let log = Log::default();
    let options = SagaOptions::parallel().with_continue_with_error(true);
    let mut saga = Saga::new(&Scope::new(), options);
    register(&mut saga, &log, "op1", Duration::ZERO, true);

    let result = saga.compensate().await;

    assert!(matches!(result, Err(SagaError::Compensation(e)) if e.failures().len() == 1));
}

#[tokio::test]
async fn parallel_without_failures_returns_ok() -> anyhow::Result<()> {
    let log = Log::default();
    let mut saga = Saga::new(&Scope::new(), SagaOptions::parallel());
    register(&mut saga, &log, "op1", Duration::ZERO, false);
    register(&mut saga, &log, "op2", Duration::ZERO, false);

    saga.compensate().await?;

    let mut ran = entries(&log);
    ran.sort_unstable();
    assert_eq!(ran, vec!["op1", "op2"]);
    Ok(())
}
