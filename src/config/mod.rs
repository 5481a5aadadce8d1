//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! (and optionally a TOML file) using the `config` and `dotenvy` crates.
//! Configuration is loaded with the `INTEROP_BROADCAST` prefix and nested values
//! use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use interop_broadcast::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Default batch size {}", config.broadcast.default_max_objects_per_event);
//! ```

mod broadcast;
mod error;
mod logging;

pub use broadcast::{BroadcastConfig, DEFAULT_MAX_OBJECTS_PER_EVENT};
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;

use serde::Deserialize;
use std::path::Path;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "INTEROP_BROADCAST";

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Broadcast engine configuration (batch sizes, send timeout)
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Logging configuration (filter, output format)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `INTEROP_BROADCAST` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `INTEROP_BROADCAST__BROADCAST__DEFAULT_MAX_OBJECTS_PER_EVENT=25`
    /// - `INTEROP_BROADCAST__BROADCAST__PROVIDER_OVERRIDES__STUDENTS=50`
    /// - `INTEROP_BROADCAST__LOGGING__JSON=false`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a file, with environment variables layered on top.
    ///
    /// The file format is inferred from its extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.broadcast.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::default()
        .prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}
