//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Default max objects per event must be greater than zero")]
    InvalidDefaultBatchSize,

    #[error("Max objects per event for provider '{0}' must be greater than zero")]
    InvalidProviderBatchSize(String),

    #[error("Send timeout must be between 1 and 300 seconds")]
    InvalidSendTimeout,

    #[error("Log level directive cannot be empty")]
    EmptyLogLevel,
}
