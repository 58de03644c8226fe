//! Global hook configuration.

use serde::{Deserialize, Serialize};

/// Controls process-wide interception of escaped errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookConfig {
    /// Subscribe to the panic and unobserved-task sources at startup.
    #[serde(default)]
    pub enabled: bool,
    /// Suppress the diagnostic record emitted for each intercepted error.
    #[serde(default)]
    pub swallow: bool,
    /// Also route intercepted errors into the asynchronous error channel.
    /// Implies `enabled`.
    #[serde(default)]
    pub universal: bool,
}
