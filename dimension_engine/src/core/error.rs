//! Error taxonomy.
//!
//! Recoverable failures travel as [`EngineError`] through `Result`s and out
//! of [`Future::join`](crate::concurrent::Future::join). Programming errors
//! (double precompute, zero worker threads, popped invariants) go through the
//! process-wide fatal handler, which by default logs and panics, terminating
//! the current thread.

use std::sync::RwLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The render was cancelled cooperatively via
    /// [`Future::cancel`](crate::concurrent::Future::cancel)
    #[error("render was cancelled")]
    Cancelled,

    /// A worker or background thread panicked; the canvas contents are
    /// undefined
    #[error("worker thread panicked")]
    WorkerPanic,
}

type FatalHandler = Box<dyn Fn(&str) + Send + Sync>;

static FATAL_HANDLER: RwLock<Option<FatalHandler>> = RwLock::new(None);

/// Replaces the process-wide fatal handler.
///
/// The handler runs before the offending thread is torn down; tests install
/// handlers to observe fatal paths. Panicking from the handler is allowed
/// (the default handler does exactly that).
pub fn set_fatal_handler(handler: impl Fn(&str) + Send + Sync + 'static) {
    *FATAL_HANDLER.write().unwrap_or_else(|e| e.into_inner()) = Some(Box::new(handler));
}

/// Restores the default fatal handler
pub fn reset_fatal_handler() {
    *FATAL_HANDLER.write().unwrap_or_else(|e| e.into_inner()) = None;
}

/// Reports an unrecoverable programming error and never returns.
pub fn fatal_error(message: &str) -> ! {
    if let Some(handler) = &*FATAL_HANDLER.read().unwrap_or_else(|e| e.into_inner()) {
        handler(message);
    } else {
        tracing::error!(target: "dimension::fatal", "{message}");
    }
    panic!("fatal engine error: {message}");
}

/// Asserts an engine invariant, routing failures through [`fatal_error`]
macro_rules! engine_assert {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            $crate::core::error::fatal_error($msg);
        }
    };
}
pub(crate) use engine_assert;
