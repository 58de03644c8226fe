//! Fluent policy registration for one error type.

use std::marker::PhantomData;

use faultline_core::raised::{ErrorLineage, ErrorType, FromMessage, Raised};

use crate::registry::{HandlerConfig, HandlerRegistry};

/// Builds and registers the policy for error type `E`.
///
/// Creating the builder registers an empty policy for `E`, replacing any
/// previous one. Each `with_*` call re-registers the updated policy, so
/// there is no terminal call to forget.
#[derive(Debug)]
pub struct PolicyBuilder<'a, E> {
    registry: &'a HandlerRegistry,
    config: HandlerConfig,
    _error: PhantomData<fn() -> E>,
}

impl<'a, E: ErrorLineage> PolicyBuilder<'a, E> {
    /// Starts a fresh policy for `E` in `registry`.
    pub fn new(registry: &'a HandlerRegistry) -> Self {
        let builder = Self {
            registry,
            config: HandlerConfig::new(),
            _error: PhantomData,
        };
        builder.commit();
        builder
    }

    /// Reroutes `E` errors through `transform`.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Raised) -> Raised + Send + Sync + 'static,
    {
        self.config = self.config.with_transform(transform);
        self.commit();
        self
    }

    /// Recovers `E` errors with the value returned by `action`.
    pub fn with_action<R, F>(mut self, action: F) -> Self
    where
        R: Send + 'static,
        F: Fn(&Raised) -> R + Send + Sync + 'static,
    {
        self.config = self.config.with_action(action);
        self.commit();
        self
    }

    /// Returns the error type this builder registers for.
    pub fn error_type(&self) -> ErrorType {
        ErrorType::of::<E>()
    }

    fn commit(&self) {
        self.registry.register(ErrorType::of::<E>(), self.config.clone());
    }
}

impl<E: FromMessage> PolicyBuilder<'_, E> {
    /// Replaces `E` errors with a new `E` carrying `message`, keeping the
    /// original as its cause where `E` supports one.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.with_transform(move |error| {
            Raised::new(E::from_message_with_cause(message.clone(), error.clone()))
        })
    }
}
