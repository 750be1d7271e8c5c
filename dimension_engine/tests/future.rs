//! Lifecycle tests for the future primitive: progress, waiting, pausing,
//! resuming and cancellation.

use dimension_engine::concurrent::{execute_concurrently, Future};
use dimension_engine::core::error::EngineError;
use std::sync::Arc;
use std::time::Duration;

const STEPS: usize = 64;

#[test]
fn progress_runs_to_completion() {
    let future = Future::spawn(|core| {
        core.set_total(STEPS);
        for _ in 0..STEPS {
            std::thread::sleep(Duration::from_millis(1));
            core.increment()?;
        }
        Ok(42)
    });

    future.wait(0.5);
    assert!(future.progress() >= 0.5);

    future.wait(1.0);
    assert!(future.is_done());
    assert_eq!(future.join(), Ok(42));
}

#[test]
fn pause_freezes_progress() {
    let future = Future::spawn(|core| {
        core.set_total(STEPS);
        for _ in 0..STEPS {
            std::thread::sleep(Duration::from_millis(1));
            core.increment()?;
        }
        Ok(())
    });

    future.wait(0.25);
    future.pause();
    let frozen = future.progress();
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(future.progress(), frozen, "workers must park while paused");
    future.resume();

    future.wait(1.0);
    assert_eq!(future.join(), Ok(()));
}

#[test]
fn pause_parks_every_worker() {
    let future = Future::spawn(|core| {
        core.set_total(4 * STEPS);
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let core = Arc::clone(core);
                move |_thread: usize, _nthreads: usize| {
                    for _ in 0..STEPS {
                        std::thread::sleep(Duration::from_millis(1));
                        core.increment()?;
                    }
                    Ok(())
                }
            })
            .collect();
        execute_concurrently(Some(core), tasks)?;
        Ok(())
    });

    future.wait(0.1);
    future.pause();
    let frozen = future.progress();
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(future.progress(), frozen);
    future.resume();

    future.wait(1.0);
    assert_eq!(future.join(), Ok(()));
}

#[test]
fn cancellation_tears_down_workers() {
    let future: Future<()> = Future::spawn(|core| {
        core.set_total(1_000_000);
        loop {
            // Only cancellation ends this loop
            core.increment()?;
            std::thread::sleep(Duration::from_millis(1));
        }
    });

    std::thread::sleep(Duration::from_millis(10));
    future.cancel();
    assert_eq!(future.join(), Err(EngineError::Cancelled));
}

#[test]
fn cancellation_wakes_paused_workers() {
    let future: Future<()> = Future::spawn(|core| {
        core.set_total(1_000_000);
        loop {
            core.increment()?;
        }
    });

    future.wait(1e-5);
    future.pause();
    // The worker is parked inside increment(); cancelling must wake it so it
    // can observe the flag once resumed
    future.cancel();
    future.resume();
    assert_eq!(future.join(), Err(EngineError::Cancelled));
}

#[test]
fn errors_surface_through_join() {
    let future: Future<()> = Future::spawn(|core| {
        core.set_total(4);
        core.increment()?;
        Err(EngineError::WorkerPanic)
    });
    assert_eq!(future.join(), Err(EngineError::WorkerPanic));
}
