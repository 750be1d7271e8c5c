//! The concurrency substrate: a [`Future`] primitive with progress
//! reporting, waiting, pausing and cancellation, plus the fork-join worker
//! pool that drives rendering across CPU cores.

pub mod future;
pub mod threads;

pub use future::{Future, FutureCore};
pub use threads::execute_concurrently;
