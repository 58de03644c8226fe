//! Errors raised by the engine itself.
//!
//! Both types are roots in the dispatch hierarchy, so policies can be
//! registered for them like for any application error.

use std::any::Any;
use std::panic::Location;

use thiserror::Error;

use crate::raised::Raised;

/// Errors produced by Faultline's own machinery.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An action recovered the error, but its value is not the type the
    /// call site asked for.
    #[error(
        "recovery for {error_type} produced {produced}, but the caller expected {expected}"
    )]
    RecoveryTypeMismatch {
        /// Type requested at the call site.
        expected: &'static str,
        /// Type the registered action returns.
        produced: &'static str,
        /// Type of the error the action recovered.
        error_type: &'static str,
        /// The recovered error.
        #[source]
        source: Raised,
    },
    /// A channel consumer was cancelled while waiting for the next error.
    #[error("error channel consumer cancelled while waiting")]
    Cancelled,
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// A panic converted into a dispatchable error.
#[derive(Debug, Clone, Error)]
#[error("panicked at {location}: {message}")]
pub struct PanicError {
    /// The panic message, when the payload was a string.
    pub message: String,
    /// `file:line:column` of the panic, or `<unknown>`.
    pub location: String,
}

impl PanicError {
    /// Builds the error from a panic payload and optional location.
    pub fn from_payload(payload: &(dyn Any + Send), location: Option<&Location<'_>>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };

        let location = location
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "<unknown>".to_string());

        Self { message, location }
    }
}

error_lineage! {
    EngineError,
    PanicError,
}
