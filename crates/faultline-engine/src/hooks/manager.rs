//! Global hook manager: lifecycle of process-wide error interception.
//!
//! Two subscription sets exist:
//! - the basic set, managed by [`enable`](GlobalHookManager::enable) and
//!   [`disable`](GlobalHookManager::disable), dispatches each intercepted
//!   error and reports the outcome unless `swallow` was requested;
//! - the universal set, added by
//!   [`initialize_universal`](GlobalHookManager::initialize_universal),
//!   dispatches and then enqueues the error onto the error channel.
//!
//! Every transition, including the full reset, is idempotent and runs
//! under one internal lock.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use faultline_core::raised::Raised;

use super::notifier::{SubscriptionId, UnhandledNotification, UnobservedNotification};
use super::process::NotificationSources;
use crate::channel::AsyncErrorChannel;
use crate::dispatcher::Dispatcher;

/// Subscription handles for one callback pair.
#[derive(Debug, Clone, Copy)]
struct Subscriptions {
    unhandled: SubscriptionId,
    unobserved: SubscriptionId,
}

/// Mutable hook state. `None` means not subscribed.
#[derive(Debug, Default)]
struct HookState {
    basic: Option<Subscriptions>,
    universal: Option<Subscriptions>,
}

/// Subscribes the dispatcher to process-wide error notifications.
#[derive(Debug)]
pub struct GlobalHookManager {
    /// Dispatcher every intercepted error is routed through.
    dispatcher: Arc<Dispatcher>,
    /// Channel fed by the universal subscriptions.
    channel: Arc<AsyncErrorChannel>,
    /// Sources to subscribe to.
    sources: NotificationSources,
    /// Current subscriptions.
    state: Mutex<HookState>,
}

impl GlobalHookManager {
    /// Creates a manager in the disabled state.
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        channel: Arc<AsyncErrorChannel>,
        sources: NotificationSources,
    ) -> Self {
        Self {
            dispatcher,
            channel,
            sources,
            state: Mutex::new(HookState::default()),
        }
    }

    /// Subscribes the basic callbacks. Returns `false` if already enabled.
    ///
    /// With `swallow`, intercepted errors are still dispatched but no
    /// diagnostic record is emitted.
    pub fn enable(&self, swallow: bool) -> bool {
        let mut state = self.state.lock();
        self.enable_locked(&mut state, swallow)
    }

    /// Removes the basic callbacks. Returns `false` if already disabled.
    pub fn disable(&self) -> bool {
        let mut state = self.state.lock();
        self.disable_locked(&mut state)
    }

    /// Adds the channel-feeding callbacks and enables basic handling.
    /// Returns `false` if already initialized.
    pub fn initialize_universal(&self) -> bool {
        let mut state = self.state.lock();
        if state.universal.is_some() {
            return false;
        }

        let unhandled = {
            let dispatcher = Arc::clone(&self.dispatcher);
            let channel = Arc::clone(&self.channel);
            self.sources
                .unhandled
                .subscribe(Arc::new(move |notification: &UnhandledNotification| {
                    let _ = dispatch(&dispatcher, &notification.error);
                    channel.enqueue(notification.error.clone());
                }))
        };

        let unobserved = {
            let dispatcher = Arc::clone(&self.dispatcher);
            let channel = Arc::clone(&self.channel);
            self.sources
                .unobserved
                .subscribe(Arc::new(move |notification: &UnobservedNotification| {
                    let _ = dispatch(&dispatcher, &notification.error);
                    channel.enqueue(notification.error.clone());
                    notification.set_observed();
                }))
        };

        state.universal = Some(Subscriptions {
            unhandled,
            unobserved,
        });
        info!("Universal error handling initialized");

        self.enable_locked(&mut state, false);
        true
    }

    /// Removes every subscription, returning to the pristine state.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        self.disable_locked(&mut state);
        if let Some(subscriptions) = state.universal.take() {
            self.unsubscribe(subscriptions);
            info!("Universal error handling reset");
        }
    }

    /// Returns whether basic handling is enabled.
    pub fn is_enabled(&self) -> bool {
        self.state.lock().basic.is_some()
    }

    /// Returns whether universal handling is initialized.
    pub fn is_universal_initialized(&self) -> bool {
        self.state.lock().universal.is_some()
    }

    /// Returns the sources this manager subscribes to.
    pub fn sources(&self) -> &NotificationSources {
        &self.sources
    }

    fn enable_locked(&self, state: &mut HookState, swallow: bool) -> bool {
        if state.basic.is_some() {
            return false;
        }

        let unhandled = {
            let dispatcher = Arc::clone(&self.dispatcher);
            self.sources
                .unhandled
                .subscribe(Arc::new(move |notification: &UnhandledNotification| {
                    let outcome = dispatch(&dispatcher, &notification.error);
                    if !swallow {
                        report("unhandled", &notification.error, &outcome);
                    }
                }))
        };

        let unobserved = {
            let dispatcher = Arc::clone(&self.dispatcher);
            self.sources
                .unobserved
                .subscribe(Arc::new(move |notification: &UnobservedNotification| {
                    let outcome = dispatch(&dispatcher, &notification.error);
                    if !swallow {
                        report("unobserved", &notification.error, &outcome);
                    }
                    notification.set_observed();
                }))
        };

        state.basic = Some(Subscriptions {
            unhandled,
            unobserved,
        });
        info!(swallow = swallow, "Global error handling enabled");
        true
    }

    fn disable_locked(&self, state: &mut HookState) -> bool {
        let Some(subscriptions) = state.basic.take() else {
            return false;
        };
        self.unsubscribe(subscriptions);
        info!("Global error handling disabled");
        true
    }

    fn unsubscribe(&self, subscriptions: Subscriptions) {
        self.sources.unhandled.unsubscribe(subscriptions.unhandled);
        self.sources.unobserved.unsubscribe(subscriptions.unobserved);
    }
}

/// Outcome of dispatching an intercepted error.
enum Outcome {
    Recovered(&'static str),
    Escaped(Raised),
}

fn dispatch(dispatcher: &Dispatcher, error: &Raised) -> Outcome {
    match dispatcher.handle_any(error.clone()) {
        Ok(recovery) => Outcome::Recovered(recovery.produced()),
        Err(escaped) => Outcome::Escaped(escaped),
    }
}

/// Diagnostic sink for intercepted errors.
fn report(source: &'static str, original: &Raised, outcome: &Outcome) {
    match outcome {
        Outcome::Recovered(produced) => warn!(
            source = source,
            error_type = %original.error_type(),
            error = %original,
            recovery = *produced,
            "Intercepted error recovered by policy"
        ),
        Outcome::Escaped(escaped) if escaped.same_as(original) => error!(
            source = source,
            error_type = %original.error_type(),
            error = %original,
            "Intercepted error has no handling policy"
        ),
        Outcome::Escaped(escaped) => error!(
            source = source,
            error_type = %original.error_type(),
            error = %original,
            escaped_type = %escaped.error_type(),
            escaped = %escaped,
            "Intercepted error rerouted and not recovered"
        ),
    }
}
