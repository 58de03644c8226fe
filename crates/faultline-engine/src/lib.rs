//! # faultline-engine
//!
//! Error dispatch engine for Faultline. Provides:
//!
//! - A concurrent handler registry keyed by error type
//! - A dispatcher that walks the declared error lineage, applies the most
//!   specific transform or action, and stops transform cycles
//! - Global hooks intercepting panics and unobserved task failures
//! - An unbounded error channel for out-of-band consumers
//! - Safe-execution wrappers and a process-wide facade

pub mod channel;
pub mod dispatcher;
pub mod engine;
pub mod global;
pub mod hooks;
pub mod policy;
pub mod registry;
pub mod safe;
pub mod supervise;

#[cfg(test)]
mod testing;

pub use channel::AsyncErrorChannel;
pub use dispatcher::{Dispatcher, Recovery};
pub use engine::ErrorEngine;
pub use global::*;
pub use hooks::{GlobalHookManager, NotificationSources};
pub use policy::PolicyBuilder;
pub use registry::{HandlerConfig, HandlerRegistry};

pub use faultline_core::{
    EngineError, ErrorLineage, ErrorType, FromMessage, PanicError, Raised, error_lineage,
};
