//! Dispatcher: routes raised errors to the most specific registered policy.
//!
//! Dispatch of one error:
//! - The error's concrete type is recorded in a per-call visited set. A
//!   type seen twice means the transforms form a cycle; the current error
//!   is re-raised.
//! - The declared ancestry is walked from the concrete type upward; the
//!   first type with any registered policy wins.
//! - A transform replaces the error and dispatch repeats with the same
//!   visited set. Otherwise an action produces the recovery value.
//! - Without a matching policy the error is re-raised unchanged.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, trace};

use faultline_core::error::EngineError;
use faultline_core::raised::{ErrorType, Raised};

use crate::registry::{HandlerConfig, HandlerRegistry};

/// A value produced by a recovery action.
pub struct Recovery {
    /// The type-erased action output.
    value: Box<dyn Any + Send>,
    /// Type name of the action output.
    produced: &'static str,
    /// The error the action was applied to.
    recovered: Raised,
}

impl Recovery {
    /// Returns the error the action recovered.
    pub fn recovered(&self) -> &Raised {
        &self.recovered
    }

    /// Returns the type name of the recovery value.
    pub fn produced(&self) -> &'static str {
        self.produced
    }

    /// Returns whether the value is an `R`.
    pub fn is<R: 'static>(&self) -> bool {
        self.value.is::<R>()
    }

    /// Extracts the value as `R`, or returns `self` unchanged.
    pub fn downcast<R: 'static>(self) -> Result<R, Self> {
        match self.value.downcast::<R>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { value, ..self }),
        }
    }

    /// Extracts the value as `R`, raising a type-mismatch error otherwise.
    pub fn into_value<R: 'static>(self) -> Result<R, Raised> {
        self.downcast::<R>().map_err(|recovery| {
            Raised::new(EngineError::RecoveryTypeMismatch {
                expected: std::any::type_name::<R>(),
                produced: recovery.produced,
                error_type: recovery.recovered.type_name(),
                source: recovery.recovered,
            })
        })
    }
}

impl fmt::Debug for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recovery")
            .field("produced", &self.produced)
            .field("recovered", &self.recovered)
            .finish()
    }
}

/// Dispatches raised errors against a [`HandlerRegistry`].
#[derive(Debug)]
pub struct Dispatcher {
    /// Policy store.
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`.
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    /// Runs `work`, dispatching its error if it fails.
    ///
    /// Returns the work's value, or the recovery value of a matching
    /// action. Errors that are not recovered are returned as `Err`.
    pub fn run<R, E, F>(&self, work: F) -> Result<R, Raised>
    where
        R: 'static,
        E: Into<Raised>,
        F: FnOnce() -> Result<R, E>,
    {
        match work() {
            Ok(value) => Ok(value),
            Err(error) => self.handle(error.into()),
        }
    }

    /// Awaits `work`, dispatching its error if it fails.
    ///
    /// Only awaiting `work` suspends; dispatch itself is synchronous.
    pub async fn run_async<R, E, Fut>(&self, work: Fut) -> Result<R, Raised>
    where
        R: 'static,
        E: Into<Raised>,
        Fut: Future<Output = Result<R, E>>,
    {
        match work.await {
            Ok(value) => Ok(value),
            Err(error) => self.handle(error.into()),
        }
    }

    /// Dispatches `error` and extracts the recovery value as `R`.
    pub fn handle<R: 'static>(&self, error: Raised) -> Result<R, Raised> {
        self.handle_any(error)?.into_value::<R>()
    }

    /// Dispatches `error`, returning the type-erased recovery.
    pub fn handle_any(&self, error: Raised) -> Result<Recovery, Raised> {
        let mut processed: HashSet<ErrorType> = HashSet::new();
        let mut current = error;

        loop {
            let error_type = current.error_type();

            if !processed.insert(error_type) {
                debug!(
                    error_type = %error_type,
                    visited = processed.len(),
                    "Transform cycle detected, re-raising"
                );
                return Err(current);
            }

            let Some((matched, config)) = self.resolve(error_type) else {
                debug!(error_type = %error_type, "No handler in error lineage");
                return Err(current);
            };

            if let Some(transform) = config.transform() {
                let next = transform(&current);
                debug!(
                    error_type = %error_type,
                    matched = %matched,
                    rerouted_to = %next.error_type(),
                    "Error rerouted by transform"
                );
                current = next;
                continue;
            }

            if let Some(action) = config.action() {
                let value = action(&current);
                debug!(
                    error_type = %error_type,
                    matched = %matched,
                    "Error recovered by action"
                );
                return Ok(Recovery {
                    value,
                    produced: config.action_output().unwrap_or("<unknown>"),
                    recovered: current,
                });
            }

            debug!(
                error_type = %error_type,
                matched = %matched,
                "Handler config has neither transform nor action"
            );
            return Err(current);
        }
    }

    /// Finds the most specific policy in `error_type`'s ancestry.
    pub fn resolve(&self, error_type: ErrorType) -> Option<(ErrorType, Arc<HandlerConfig>)> {
        error_type.ancestry().find_map(|candidate| {
            trace!(candidate = %candidate, "Looking up handler");
            self.registry
                .lookup(&candidate)
                .map(|config| (candidate, config))
        })
    }

    /// Returns the policy store.
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }
}
