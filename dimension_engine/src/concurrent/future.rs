//! Future objects.
//!
//! A [`Future`] tracks a background computation: consumers poll or block on
//! its progress, pause and resume the workers, or cancel the whole
//! computation. Workers report through the shared [`FutureCore`], whose
//! [`increment`](FutureCore::increment) is the *only* worker-side suspension
//! point: pausing and cancellation both take effect there.

use crate::core::error::{engine_assert, fatal_error, EngineError};
use parking_lot::{Condvar, Mutex};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

struct ProgressState {
    progress: usize,
    total: usize,
    /// The smallest progress fraction any consumer is waiting on
    min_wait: f64,
    nthreads: usize,
    nrunning: usize,
    npaused: usize,
}

impl ProgressState {
    fn fraction(&self) -> f64 {
        self.progress as f64 / self.total as f64
    }
}

/// The state shared between a future's consumers and its worker threads.
///
/// All four condition variables are disciplined by the single mutex; the
/// mutex is always taken alone, so the monitor is deadlock-free.
pub struct FutureCore {
    state: Mutex<ProgressState>,
    /// Progress passed a waited-on threshold
    progress_cv: Condvar,
    /// `nrunning` reached zero (all workers parked in a pause)
    none_running_cv: Condvar,
    /// `nrunning` climbed back to `nthreads`
    all_running_cv: Condvar,
    /// `npaused` dropped to zero
    resume_cv: Condvar,
    cancelled: AtomicBool,
}

impl Default for FutureCore {
    fn default() -> Self {
        Self::new()
    }
}

impl FutureCore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProgressState {
                progress: 0,
                total: 1,
                min_wait: 1.0,
                nthreads: 1,
                nrunning: 1,
                npaused: 0,
            }),
            progress_cv: Condvar::new(),
            none_running_cv: Condvar::new(),
            all_running_cv: Condvar::new(),
            resume_cv: Condvar::new(),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Current progress in `[0.0, 1.0]`
    pub fn progress(&self) -> f64 {
        self.state.lock().fraction()
    }

    pub fn is_done(&self) -> bool {
        let state = self.state.lock();
        state.progress == state.total
    }

    /// Blocks until `progress() >= threshold`
    pub fn wait(&self, threshold: f64) {
        let mut state = self.state.lock();
        while state.fraction() < threshold {
            // Remember the smallest waited-on threshold so workers know when
            // a broadcast is worthwhile
            if threshold < state.min_wait {
                state.min_wait = threshold;
            }
            self.progress_cv.wait(&mut state);
        }
    }

    /// Sets the total number of loop iterations; the producer calls this
    /// once before iterating
    pub fn set_total(&self, total: usize) {
        self.state.lock().total = total;
    }

    /// Records one completed iteration.
    ///
    /// This doubles as the worker's cancellation test point and pause point:
    /// a cancelled future makes every subsequent `increment` return
    /// [`EngineError::Cancelled`], and a paused future parks the caller here
    /// until [`resume`](Self::resume).
    pub fn increment(&self) -> Result<(), EngineError> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(EngineError::Cancelled);
        }

        let mut state = self.state.lock();
        state.progress += 1;

        if state.fraction() >= state.min_wait {
            state.min_wait = 1.0;
            self.progress_cv.notify_all();
        }

        if state.npaused > 0 {
            engine_assert!(state.nrunning > 0, "more worker threads than expected");
            state.nrunning -= 1;
            if state.nrunning == 0 {
                self.none_running_cv.notify_all();
            }

            while state.npaused > 0 {
                if self.cancelled.load(Ordering::Relaxed) {
                    // Restore the running count before unwinding, as a
                    // cancellation cleanup handler would
                    state.nrunning += 1;
                    return Err(EngineError::Cancelled);
                }
                self.resume_cv.wait(&mut state);
            }

            state.nrunning += 1;
            if state.nrunning == state.nthreads {
                self.all_running_cv.notify_all();
            }
        }

        Ok(())
    }

    /// Pauses all threads working on this future, returning once every
    /// worker is parked. Pauses nest by counting.
    pub fn pause(&self) {
        let mut state = self.state.lock();
        while state.nrunning < state.nthreads {
            self.all_running_cv.wait(&mut state);
        }
        state.npaused += 1;
        if state.npaused == 1 {
            while state.nrunning > 0 {
                self.none_running_cv.wait(&mut state);
            }
        }
    }

    /// Releases one [`pause`](Self::pause)
    pub fn resume(&self) {
        let mut state = self.state.lock();
        engine_assert!(state.npaused > 0, "resume() without matching pause()");
        state.npaused -= 1;
        if state.npaused == 0 {
            self.resume_cv.notify_all();
        }
    }

    /// Requests cooperative cancellation; workers observe it at their next
    /// [`increment`](Self::increment)
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        // Wake workers parked in a pause so they can observe the flag
        self.resume_cv.notify_all();
    }

    pub fn cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Immediately reports 100% completion and wakes every waiter; used on
    /// error or early exit
    pub fn finish(&self) {
        let mut state = self.state.lock();
        state.progress = state.total;
        state.nthreads = 0;
        state.nrunning = 0;
        self.progress_cv.notify_all();
        self.none_running_cv.notify_all();
        self.all_running_cv.notify_all();
    }

    /// Declares the number of worker threads about to run
    pub(crate) fn set_nthreads(&self, nthreads: usize) {
        let mut state = self.state.lock();
        engine_assert!(
            state.nrunning == state.nthreads,
            "set_nthreads() called with paused threads"
        );
        state.nthreads = nthreads;
        state.nrunning = nthreads;
    }

    /// Notes the completion of one worker thread
    pub(crate) fn thread_done(&self) {
        let mut state = self.state.lock();
        engine_assert!(state.nthreads > 0, "thread_done() called with no threads");
        state.nthreads -= 1;
        engine_assert!(state.nrunning > 0, "thread_done() called with no running threads");
        state.nrunning -= 1;
        if state.nrunning == 0 {
            self.none_running_cv.notify_all();
        }
    }
}

/// A handle on a background computation producing a `T`.
///
/// Dropping the handle without [`join`](Future::join)ing detaches the
/// background thread; cancel first to stop it early.
pub struct Future<T> {
    core: Arc<FutureCore>,
    thread: JoinHandle<Result<T, EngineError>>,
}

impl<T: Send + 'static> Future<T> {
    /// Spawns `f` on a background thread, handing it the shared core for
    /// progress reporting
    pub fn spawn<F>(f: F) -> Self
    where
        F: FnOnce(&Arc<FutureCore>) -> Result<T, EngineError> + Send + 'static,
    {
        let core = Arc::new(FutureCore::new());
        let worker_core = Arc::clone(&core);

        let thread = std::thread::Builder::new()
            .name("dimension::background".into())
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| f(&worker_core)))
                    .unwrap_or(Err(EngineError::WorkerPanic));
                // Wake every waiter even on failure
                worker_core.finish();
                result
            });

        match thread {
            Ok(thread) => Self { core, thread },
            Err(_) => fatal_error("couldn't start background thread"),
        }
    }

    pub fn progress(&self) -> f64 {
        self.core.progress()
    }

    pub fn is_done(&self) -> bool {
        self.core.is_done()
    }

    /// Blocks until `progress() >= threshold`
    pub fn wait(&self, threshold: f64) {
        self.core.wait(threshold);
    }

    /// Pauses the computation; every worker parks at its next suspension
    /// point before this returns
    pub fn pause(&self) {
        self.core.pause();
    }

    pub fn resume(&self) {
        self.core.resume();
    }

    /// Requests cooperative cancellation; [`join`](Self::join) then returns
    /// [`EngineError::Cancelled`]
    pub fn cancel(&self) {
        self.core.cancel();
    }

    /// Waits for the background thread and returns its result
    pub fn join(self) -> Result<T, EngineError> {
        self.thread.join().unwrap_or(Err(EngineError::WorkerPanic))
    }
}
