//! Safe-execution wrappers: run work, export its failure, and fall back.

use std::future::Future;

use tracing::{debug, warn};

use faultline_core::raised::Raised;

use crate::engine::ErrorEngine;

impl ErrorEngine {
    /// Runs `work`; on failure enqueues the error, dispatches it, and
    /// returns the recovery value or `fallback`.
    pub fn execute<R, E, F>(&self, work: F, fallback: R) -> R
    where
        R: 'static,
        E: Into<Raised>,
        F: FnOnce() -> Result<R, E>,
    {
        match work() {
            Ok(value) => value,
            Err(error) => self.recover_or(error.into(), fallback),
        }
    }

    /// Asynchronous form of [`execute`](Self::execute).
    pub async fn execute_async<R, E, Fut>(&self, work: Fut, fallback: R) -> R
    where
        R: 'static,
        E: Into<Raised>,
        Fut: Future<Output = Result<R, E>>,
    {
        match work.await {
            Ok(value) => value,
            Err(error) => self.recover_or(error.into(), fallback),
        }
    }

    fn recover_or<R: 'static>(&self, error: Raised, fallback: R) -> R {
        self.enqueue_exception(error.clone());
        match self.handle_any(error) {
            Ok(recovery) => match recovery.downcast::<R>() {
                Ok(value) => value,
                Err(recovery) => {
                    warn!(
                        error_type = %recovery.recovered().error_type(),
                        expected = std::any::type_name::<R>(),
                        produced = recovery.produced(),
                        "Recovery value has the wrong type, using fallback"
                    );
                    fallback
                }
            },
            Err(escaped) => {
                debug!(
                    error_type = %escaped.error_type(),
                    error = %escaped,
                    "No recovery value, using fallback"
                );
                fallback
            }
        }
    }
}
