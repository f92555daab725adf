//! Core error types for restnow-core.
//!
//! The phase timer itself has no failure path. Errors only arise at the
//! edges: loading or saving settings, validating user-supplied durations, and
//! presentation collaborators reporting that a surface could not be drawn.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for restnow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Observer errors
    #[error("Observer error: {0}")]
    Observer(#[from] ObserverError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Config directory could not be resolved or created
    #[error("Failed to prepare config directory {path}: {source}")]
    DirUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Duration must be strictly positive
    #[error("{field} duration must be greater than zero")]
    ZeroDuration { field: &'static str },

    /// Duration text could not be parsed
    #[error("Invalid duration '{input}': {message}")]
    InvalidDuration { input: String, message: String },
}

/// Failure reported by a notification observer.
///
/// Returned to the observation bus, which logs it and keeps delivering to
/// the remaining observers.
#[derive(Error, Debug)]
pub enum ObserverError {
    /// A presentation surface could not be rendered
    #[error("surface '{surface}' failed: {message}")]
    Surface { surface: String, message: String },

    /// A sink (terminal, notification daemon) rejected the update
    #[error("{sink} sink failed: {message}")]
    Sink { sink: &'static str, message: String },

    /// IO failure while writing an update
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
