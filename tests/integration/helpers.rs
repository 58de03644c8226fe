//! Shared error types and setup for integration tests.

use faultline_engine::{ErrorEngine, FromMessage, Raised, error_lineage};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct NetworkFault(pub String);

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TimeoutFault(pub String);

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ReadTimeout(pub String);

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ValidationFault {
    pub message: String,
    #[source]
    pub cause: Option<Raised>,
}

impl FromMessage for ValidationFault {
    fn from_message(message: String) -> Self {
        Self {
            message,
            cause: None,
        }
    }

    fn from_message_with_cause(message: String, cause: Raised) -> Self {
        Self {
            message,
            cause: Some(cause),
        }
    }
}

error_lineage! {
    NetworkFault,
    TimeoutFault => NetworkFault,
    ReadTimeout => TimeoutFault,
    ValidationFault,
}

/// Returns the global engine reset to its pristine state.
pub fn pristine_engine() -> &'static ErrorEngine {
    let engine = ErrorEngine::global();
    engine.shutdown();
    while engine.channel().try_next().is_some() {}
    engine
}
