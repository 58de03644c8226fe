//! Notification sources that global hooks subscribe to.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use faultline_core::raised::Raised;

/// Handle identifying one subscription, used to unsubscribe precisely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked for each published notification.
pub type Callback<N> = Arc<dyn Fn(&N) + Send + Sync>;

/// Raised when an error escaped all supervision (a panic).
#[derive(Debug, Clone)]
pub struct UnhandledNotification {
    /// The escaped error.
    pub error: Raised,
    /// Name of the thread the error escaped on, if named.
    pub thread: Option<String>,
}

impl UnhandledNotification {
    /// Creates a notification for `error`.
    pub fn new(error: Raised, thread: Option<String>) -> Self {
        Self { error, thread }
    }
}

/// Raised when a detached asynchronous task failed and nobody awaited it.
#[derive(Debug)]
pub struct UnobservedNotification {
    /// The task's error.
    pub error: Raised,
    /// Whether a subscriber claimed the error.
    observed: AtomicBool,
}

impl UnobservedNotification {
    /// Creates an unobserved notification for `error`.
    pub fn new(error: Raised) -> Self {
        Self {
            error,
            observed: AtomicBool::new(false),
        }
    }

    /// Marks the error as observed so the publisher does not treat it as
    /// lost.
    pub fn set_observed(&self) {
        self.observed.store(true, Ordering::Release);
    }

    /// Returns whether any subscriber marked the error as observed.
    pub fn is_observed(&self) -> bool {
        self.observed.load(Ordering::Acquire)
    }
}

/// A process-wide notification source with precise unsubscription.
pub struct Notifier<N> {
    /// Source name for diagnostics.
    name: &'static str,
    /// Monotonic id counter.
    next_id: AtomicU64,
    /// Subscribers in subscription order.
    subscribers: RwLock<Vec<(SubscriptionId, Callback<N>)>>,
}

impl<N> Notifier<N> {
    /// Creates a source with no subscribers.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: AtomicU64::new(1),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Adds `callback` and returns its subscription handle.
    pub fn subscribe(&self, callback: Callback<N>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, callback));
        debug!(source = self.name, subscription = id.0, "Subscribed");
        id
    }

    /// Removes the subscription `id`. Returns whether it was present.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        let removed = subscribers.len() != before;
        debug!(
            source = self.name,
            subscription = id.0,
            removed = removed,
            "Unsubscribed"
        );
        removed
    }

    /// Delivers `notification` to every subscriber, returning how many
    /// were called.
    ///
    /// Callbacks run outside the subscriber lock, so they may subscribe or
    /// unsubscribe without deadlocking.
    pub fn publish(&self, notification: &N) -> usize {
        let callbacks: Vec<Callback<N>> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in &callbacks {
            callback(notification);
        }
        callbacks.len()
    }

    /// Returns the number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns the source name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<N> fmt::Debug for Notifier<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("name", &self.name)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
