//! Off-thread execution for blocking store calls.
//!
//! Store operations touch the disk and may block. Screens never run them
//! inline; they hand them to a [`Dispatcher`], which runs the closure on the
//! runtime's blocking pool and resolves exactly once with its result.

use crate::core::error::GuauMiauError;
use tokio::runtime::Handle;

#[derive(Debug, Clone)]
pub struct Dispatcher {
    handle: Handle,
}

impl Dispatcher {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Dispatcher bound to the runtime the caller is running on.
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    pub async fn run<F, R>(&self, op: &'static str, f: F) -> Result<R, GuauMiauError>
    where
        F: FnOnce() -> Result<R, GuauMiauError> + Send + 'static,
        R: Send + 'static,
    {
        tracing::trace!(op, "dispatching to blocking pool");
        self.handle
            .spawn_blocking(f)
            .await
            .map_err(|e| GuauMiauError::WorkerError(format!("{}: {}", op, e)))?
    }
}
