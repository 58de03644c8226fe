//! Handler registry: concurrent map from error type to handling policy.
//!
//! The registry is a plain store: it answers exact-type lookups only.
//! Walking the error hierarchy is the dispatcher's job.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use faultline_core::raised::{ErrorType, Raised};

/// Replaces an error with another error to be dispatched in its place.
pub type TransformFn = Arc<dyn Fn(&Raised) -> Raised + Send + Sync>;

/// Converts an error into a type-erased recovery value.
pub type ActionFn = Arc<dyn Fn(&Raised) -> Box<dyn Any + Send> + Send + Sync>;

/// Handling policy registered for one error type.
///
/// Either field, both, or neither may be set. When a transform is present
/// the dispatcher applies it and never consults the action.
#[derive(Clone, Default)]
pub struct HandlerConfig {
    /// Rerouting transform.
    transform: Option<TransformFn>,
    /// Terminal recovery action.
    action: Option<ActionFn>,
    /// Type name of the action's output.
    action_output: Option<&'static str>,
}

impl HandlerConfig {
    /// Creates an empty (no-op) policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transform, replacing any previous one.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Raised) -> Raised + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Sets the action, replacing any previous one.
    pub fn with_action<R, F>(mut self, action: F) -> Self
    where
        R: Send + 'static,
        F: Fn(&Raised) -> R + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(move |error: &Raised| {
            Box::new(action(error)) as Box<dyn Any + Send>
        }));
        self.action_output = Some(std::any::type_name::<R>());
        self
    }

    /// Returns the transform, if any.
    pub fn transform(&self) -> Option<&TransformFn> {
        self.transform.as_ref()
    }

    /// Returns the action, if any.
    pub fn action(&self) -> Option<&ActionFn> {
        self.action.as_ref()
    }

    /// Returns the type name produced by the action.
    pub fn action_output(&self) -> Option<&'static str> {
        self.action_output
    }

    /// Returns whether neither a transform nor an action is set.
    pub fn is_empty(&self) -> bool {
        self.transform.is_none() && self.action.is_none()
    }
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("transform", &self.transform.is_some())
            .field("action", &self.action_output)
            .finish()
    }
}

/// Registry of handling policies keyed by concrete error type.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    /// Error type → policy. Last write wins.
    handlers: DashMap<ErrorType, Arc<HandlerConfig>>,
}

impl HandlerRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Stores the policy for `error_type`, replacing any existing one.
    pub fn register(&self, error_type: ErrorType, config: HandlerConfig) {
        let replaced = self
            .handlers
            .insert(error_type, Arc::new(config))
            .is_some();

        debug!(
            error_type = %error_type,
            replaced = replaced,
            "Handler config registered"
        );
    }

    /// Returns the policy registered for exactly `error_type`.
    pub fn lookup(&self, error_type: &ErrorType) -> Option<Arc<HandlerConfig>> {
        self.handlers
            .get(error_type)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Returns whether a policy is registered for exactly `error_type`.
    pub fn contains(&self, error_type: &ErrorType) -> bool {
        self.handlers.contains_key(error_type)
    }

    /// Removes every policy.
    pub fn clear(&self) {
        let count = self.handlers.len();
        self.handlers.clear();
        info!(removed = count, "Handler registry cleared");
    }

    /// Returns the number of registered policies.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns whether no policy is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
