//! Free functions over the process-wide [`ErrorEngine`].

use std::future::Future;

use futures::Stream;
use tokio_util::sync::CancellationToken;

use faultline_core::error::EngineError;
use faultline_core::raised::{ErrorLineage, Raised};

use crate::engine::ErrorEngine;
use crate::policy::PolicyBuilder;

/// Starts (and immediately registers) the global policy for `E`.
pub fn policy_for<E: ErrorLineage>() -> PolicyBuilder<'static, E> {
    ErrorEngine::global().policy::<E>()
}

/// Runs `work` under the global dispatcher.
pub fn run<R, E, F>(work: F) -> Result<R, Raised>
where
    R: 'static,
    E: Into<Raised>,
    F: FnOnce() -> Result<R, E>,
{
    ErrorEngine::global().run(work)
}

/// Awaits `work` under the global dispatcher.
pub async fn run_async<R, E, Fut>(work: Fut) -> Result<R, Raised>
where
    R: 'static,
    E: Into<Raised>,
    Fut: Future<Output = Result<R, E>>,
{
    ErrorEngine::global().run_async(work).await
}

/// Dispatches `error` with the global policies.
pub fn handle<R: 'static>(error: Raised) -> Result<R, Raised> {
    ErrorEngine::global().handle(error)
}

/// Subscribes the global dispatcher to panics and unobserved task failures.
pub fn enable_global_handling(swallow: bool) -> bool {
    ErrorEngine::global().enable_global_handling(swallow)
}

/// Removes the basic global subscriptions.
pub fn disable_global_handling() -> bool {
    ErrorEngine::global().disable_global_handling()
}

/// Enables global handling that also feeds the global error channel.
pub fn initialize_universal_handling() -> bool {
    ErrorEngine::global().initialize_universal_handling()
}

/// Returns the global engine to its pristine state.
pub fn shutdown() {
    ErrorEngine::global().shutdown();
}

/// Removes every global policy.
pub fn clear_handlers() {
    ErrorEngine::global().clear_handlers();
}

/// Enqueues `error` on the global channel.
pub fn enqueue_exception(error: Raised) {
    ErrorEngine::global().enqueue_exception(error);
}

/// Enqueues `error` on the global channel.
pub async fn write_exception(error: Raised) {
    ErrorEngine::global().write_exception(error).await;
}

/// Streams errors from the global channel until `cancel` fires.
pub fn read_exceptions(
    cancel: CancellationToken,
) -> impl Stream<Item = Result<Raised, EngineError>> + Send + 'static {
    ErrorEngine::global().read_exceptions(cancel)
}
