//! Engine configuration schemas.
//!
//! Deserialized via the `config` crate from an optional TOML file merged
//! with `FAULTLINE__`-prefixed environment variables.

pub mod hooks;
pub mod logging;

use serde::{Deserialize, Serialize};

use self::hooks::HookConfig;
use self::logging::LoggingConfig;

use crate::error::EngineError;

/// Root engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Global hook settings.
    #[serde(default)]
    pub hooks: HookConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from `path` (extension optional, file optional)
    /// and the environment.
    ///
    /// Environment variables use the `FAULTLINE` prefix and `__` as the
    /// section separator, e.g. `FAULTLINE__HOOKS__ENABLED=true`.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("FAULTLINE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| EngineError::Configuration(format!("Failed to build config: {e}")))?;

        Ok(config.try_deserialize()?)
    }
}
