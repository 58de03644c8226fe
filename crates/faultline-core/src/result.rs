//! Convenience result type aliases for Faultline.

use crate::error::EngineError;
use crate::raised::Raised;

/// A specialized `Result` for operations of the engine's own machinery.
pub type EngineResult<T> = Result<T, EngineError>;

/// A `Result` whose failure is a dispatchable [`Raised`] error.
pub type RaisedResult<T> = Result<T, Raised>;
