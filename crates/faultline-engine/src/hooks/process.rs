//! Process-wide notification sources.
//!
//! The "escaped all supervision" source is fed by the panic hook. The
//! bridge is installed once, on first use, and chains the hook that was
//! active before it: when nobody is subscribed the previous hook runs as
//! if the bridge were not there.
//!
//! The "unobserved asynchronous error" source is fed by detached tasks
//! started through [`spawn_detached`](crate::supervise::spawn_detached).

use std::panic;
use std::sync::{Arc, LazyLock, Once};

use faultline_core::error::PanicError;
use faultline_core::raised::Raised;

use super::notifier::{Notifier, UnhandledNotification, UnobservedNotification};

static UNHANDLED: LazyLock<Arc<Notifier<UnhandledNotification>>> =
    LazyLock::new(|| Arc::new(Notifier::new("process.unhandled")));

static UNOBSERVED: LazyLock<Arc<Notifier<UnobservedNotification>>> =
    LazyLock::new(|| Arc::new(Notifier::new("process.unobserved")));

static PANIC_BRIDGE: Once = Once::new();

/// The pair of sources global hooks subscribe to.
#[derive(Debug, Clone)]
pub struct NotificationSources {
    /// Errors that escaped all supervision.
    pub unhandled: Arc<Notifier<UnhandledNotification>>,
    /// Failures of detached tasks nobody awaited.
    pub unobserved: Arc<Notifier<UnobservedNotification>>,
}

impl NotificationSources {
    /// Returns the process-wide sources, installing the panic bridge.
    pub fn process() -> Self {
        install_panic_bridge();
        Self {
            unhandled: Arc::clone(&UNHANDLED),
            unobserved: Arc::clone(&UNOBSERVED),
        }
    }

    /// Returns fresh sources connected to nothing in the process.
    pub fn isolated() -> Self {
        Self {
            unhandled: Arc::new(Notifier::new("isolated.unhandled")),
            unobserved: Arc::new(Notifier::new("isolated.unobserved")),
        }
    }
}

/// Routes panics to the process-wide unhandled source.
///
/// Subscribers run inside the panic hook; a panic raised by a subscriber
/// aborts the process.
fn install_panic_bridge() {
    PANIC_BRIDGE.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if UNHANDLED.subscriber_count() == 0 {
                previous(info);
                return;
            }

            let error = Raised::new(PanicError::from_payload(info.payload(), info.location()));
            let thread = std::thread::current().name().map(str::to_string);
            UNHANDLED.publish(&UnhandledNotification::new(error, thread));
        }));
    });
}
