//! Configuration schemas.
//!
//! Deserialized via the `config` crate from optional TOML files plus
//! `CANOPY__`-prefixed environment variables. Every field carries a serde
//! default so an empty source still produces a usable configuration.

pub mod access;
pub mod logging;
pub mod tree;

use std::path::Path;

use serde::{Deserialize, Serialize};

use self::access::AccessConfig;
use self::logging::LoggingConfig;
use self::tree::TreeConfig;

use crate::error::AppError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanopyConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Mutation engine settings.
    #[serde(default)]
    pub tree: TreeConfig,
    /// Access resolver settings.
    #[serde(default)]
    pub access: AccessConfig,
}

impl CanopyConfig {
    /// Load configuration from TOML files and the environment.
    ///
    /// Merges `config/default` with an environment-specific overlay and
    /// environment variables prefixed with `CANOPY__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(Path::new("config"), env)
    }

    /// Same as [`CanopyConfig::load`], reading `default` and `{env}` from `dir`.
    pub fn load_from(dir: &Path, env: &str) -> Result<Self, AppError> {
        let default = dir.join("default");
        let overlay = dir.join(env);
        let config = config::Config::builder()
            .add_source(config::File::with_name(&default.to_string_lossy()).required(false))
            .add_source(config::File::with_name(&overlay.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix("CANOPY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an inline TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
