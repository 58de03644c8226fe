//! Detached task supervision feeding the unobserved-error source.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::error;

use faultline_core::raised::Raised;

use crate::hooks::notifier::{Notifier, UnobservedNotification};

/// Publishes a failure nobody awaited. Returns whether a subscriber
/// observed it; unobserved failures are logged as lost.
pub fn report_unobserved(source: &Notifier<UnobservedNotification>, error: Raised) -> bool {
    let notification = UnobservedNotification::new(error);
    source.publish(&notification);

    let observed = notification.is_observed();
    if !observed {
        error!(
            source = source.name(),
            error_type = %notification.error.error_type(),
            error = %notification.error,
            "Unobserved task failure"
        );
    }
    observed
}

/// Spawns `future` on the current tokio runtime without a consumer for its
/// error. A failure is published to `source` as unobserved.
pub fn spawn_detached<F, T, E>(
    source: Arc<Notifier<UnobservedNotification>>,
    future: F,
) -> JoinHandle<()>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Into<Raised> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(error) = future.await {
            report_unobserved(&source, error.into());
        }
    })
}
