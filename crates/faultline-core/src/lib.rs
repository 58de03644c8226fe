//! # faultline-core
//!
//! Core crate for Faultline. Contains the error lineage model used for
//! hierarchy dispatch, the [`Raised`] error carrier, configuration
//! schemas, and the engine's own error types.
//!
//! This crate has **no** internal dependencies on other Faultline crates.

#[macro_use]
pub mod macros;

pub mod config;
pub mod error;
pub mod raised;
pub mod result;

pub use error::{EngineError, PanicError};
pub use raised::{ErrorLineage, ErrorType, FromMessage, Raisable, Raised};
pub use result::{EngineResult, RaisedResult};
