//! Fork-join execution of a batch of tasks over OS threads.

use crate::concurrent::FutureCore;
use crate::core::error::{engine_assert, EngineError};
use std::sync::Arc;
use tracing::trace;

/// Runs every task on its own thread and joins them all.
///
/// Task `i` of `n` receives `(i, n)`. If a future is given, it is told the
/// thread count up front, each task reports completion through it, and the
/// count is restored to one afterwards. All tasks are always joined; the
/// first failure (in task order) becomes the aggregate result.
pub fn execute_concurrently<R, F>(
    future: Option<&Arc<FutureCore>>,
    tasks: Vec<F>,
) -> Result<Vec<R>, EngineError>
where
    F: FnOnce(usize, usize) -> Result<R, EngineError> + Send,
    R: Send,
{
    let nthreads = tasks.len();
    engine_assert!(nthreads > 0, "attempt to execute using zero concurrent threads");

    if let Some(future) = future {
        future.set_nthreads(nthreads);
    }

    let results: Vec<Result<R, EngineError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = tasks
            .into_iter()
            .enumerate()
            .map(|(i, task)| {
                let future = future.cloned();
                scope.spawn(move || {
                    trace!(target: "dimension::threads", thread = i, "worker start");
                    let ret = task(i, nthreads);
                    if let Some(future) = &future {
                        future.thread_done();
                    }
                    trace!(target: "dimension::threads", thread = i, ok = ret.is_ok(), "worker exit");
                    ret
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(Err(EngineError::WorkerPanic)))
            .collect()
    });

    if let Some(future) = future {
        future.set_nthreads(1);
    }

    let mut values = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(error) => first_error = first_error.or(Some(error)),
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => Ok(values),
    }
}

/// The number of hardware threads, used when a scene leaves `nthreads` at
/// zero
pub fn hardware_concurrency() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_all_tasks() {
        let tasks: Vec<_> = (0..4).map(|_| |i: usize, n: usize| Ok(i * 10 + n)).collect();
        let results = execute_concurrently::<usize, _>(None, tasks).expect("no failures");
        assert_eq!(results, vec![4, 14, 24, 34]);
    }

    #[test]
    fn first_error_wins_after_joining_all() {
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                |i: usize, _n: usize| {
                    if i % 2 == 1 {
                        Err(EngineError::Cancelled)
                    } else {
                        Ok(i)
                    }
                }
            })
            .collect();
        let err = execute_concurrently::<usize, _>(None, tasks).expect_err("should fail");
        assert_eq!(err, EngineError::Cancelled);
    }
}
