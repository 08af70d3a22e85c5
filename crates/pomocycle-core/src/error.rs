//! Core error types for pomocycle-core.
//!
//! Nothing in this crate is fatal to the host: persistence and completion
//! errors are logged at their boundary, and only validation errors reach
//! the caller of a settings write.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomocycle-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A countdown completed for a phase that never arms one.
    #[error("countdown completed for untimed phase '{0}'")]
    UnexpectedCompletion(crate::timer::Phase),

    /// The session runtime task is gone.
    #[error("session runtime is not running")]
    RuntimeClosed,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: ValidationError,
    },

    /// Key is not a settable configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value parsed but is zero or negative
    #[error("duration must be a positive number of minutes, got {0}")]
    NonPositiveDuration(i64),

    /// Value is not an integer
    #[error("'{0}' is not a whole number of minutes")]
    NotANumber(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
