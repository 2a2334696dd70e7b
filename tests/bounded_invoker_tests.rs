use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use sim_figures::core::Figure;
use sim_figures::error::FigureError;
use sim_figures::invoke::{
    run_named_with_timeout, run_with_timeout, run_with_timeout_secs, spawn_bounded,
};

#[test]
fn fast_operation_returns_its_value_unchanged() {
    let figure = Figure::new("accuracy").with_axis_titles("time", "accuracy");
    let expected = figure.clone();

    let value = run_with_timeout(Duration::from_secs(2), move |_| Ok(figure)).expect("in time");
    assert_eq!(value, expected);
}

#[test]
fn operation_error_propagates_unchanged() {
    let result: Result<u32, _> = run_with_timeout(Duration::from_secs(2), |_| {
        Err(FigureError::render("pdr_profit_vs_time", "no trades"))
    });
    match result {
        Err(FigureError::Render { figure, message }) => {
            assert_eq!(figure, "pdr_profit_vs_time");
            assert_eq!(message, "no trades");
        }
        other => panic!("expected render error, got {other:?}"),
    }
}

#[test]
fn slow_operation_times_out_without_waiting_for_it() {
    let started = Instant::now();
    let result = run_with_timeout(Duration::from_millis(50), |_| {
        thread::sleep(Duration::from_secs(3));
        Ok(())
    });
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(FigureError::Timeout { .. })));
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_secs(1), "returned after {elapsed:?}");
}

#[test]
fn timeout_error_reports_deadline_in_seconds() {
    let err = run_with_timeout_secs(0.05, |_| {
        thread::sleep(Duration::from_secs(2));
        Ok(())
    })
    .expect_err("must time out");
    match err {
        FigureError::Timeout { seconds } => assert!((seconds - 0.05).abs() < 1e-9),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn timeout_requests_cooperative_cancellation() {
    let observed = Arc::new(AtomicBool::new(false));
    let worker_observed = Arc::clone(&observed);

    let result = run_with_timeout(Duration::from_millis(30), move |token| {
        while !token.is_cancelled() {
            thread::sleep(Duration::from_millis(2));
        }
        worker_observed.store(true, Ordering::SeqCst);
        Ok(())
    });
    assert!(result.is_err());

    let deadline = Instant::now() + Duration::from_secs(2);
    while !observed.load(Ordering::SeqCst) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(observed.load(Ordering::SeqCst), "worker never saw the cancel flag");
}

#[test]
fn orphaned_worker_does_not_starve_later_calls() {
    let stuck = run_with_timeout(Duration::from_millis(20), |_| {
        thread::sleep(Duration::from_secs(2));
        Ok(0u8)
    });
    assert!(stuck.is_err());

    let started = Instant::now();
    let value = run_with_timeout(Duration::from_secs(1), |_| Ok(7u8)).expect("fresh worker");
    assert_eq!(value, 7);
    assert!(started.elapsed() < Duration::from_millis(500));
}

#[test]
fn worker_panic_is_reported_with_its_message() {
    let result: Result<(), _> = run_with_timeout(Duration::from_secs(2), |_| {
        panic!("plotting blew up");
    });
    match result {
        Err(FigureError::WorkerPanicked { message }) => assert_eq!(message, "plotting blew up"),
        other => panic!("expected worker panic, got {other:?}"),
    }
}

#[test]
fn non_positive_deadlines_are_rejected() {
    assert!(matches!(
        run_with_timeout(Duration::ZERO, |_| Ok(())),
        Err(FigureError::InvalidConfig(_))
    ));
    assert!(matches!(
        run_with_timeout_secs(-0.5, |_| Ok(())),
        Err(FigureError::InvalidConfig(_))
    ));
}

#[test]
fn spawned_task_starts_before_wait() {
    let started = Arc::new(AtomicBool::new(false));
    let worker_started = Arc::clone(&started);
    let task = spawn_bounded("eager", move |_| {
        worker_started.store(true, Ordering::SeqCst);
        Ok(())
    })
    .expect("spawn");

    let deadline = Instant::now() + Duration::from_secs(2);
    while !started.load(Ordering::SeqCst) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(2));
    }
    assert!(started.load(Ordering::SeqCst));
    task.wait(Duration::from_secs(1)).expect("result");
}

fn worker_name() -> Result<Option<String>, FigureError> {
    Ok(thread::current().name().map(str::to_owned))
}

#[test]
fn workers_are_named_after_their_call_site() {
    let first = run_with_timeout(Duration::from_secs(2), |_| worker_name()).expect("name");
    let second = run_with_timeout(Duration::from_secs(2), |_| worker_name()).expect("name");

    let first = first.expect("worker thread is named");
    let second = second.expect("worker thread is named");
    assert!(first.starts_with("figure-bounded_invoker_tests:"), "got {first}");
    assert_ne!(first, second);
}

#[test]
fn explicit_label_names_the_worker() {
    let name = run_named_with_timeout("accuracy_vs_time", Duration::from_secs(2), |_| {
        worker_name()
    })
    .expect("name");
    assert_eq!(name.as_deref(), Some("figure-accuracy_vs_time"));
}
