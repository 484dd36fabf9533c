//! Core error types for restset-core.
//!
//! Every error here is local and non-fatal: a rejected command leaves the
//! engine and session state exactly as they were.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for restset-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer command rejected
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A custom duration slot was selected before it was configured
    #[error("Custom duration slot {0} is not set")]
    CustomSlotUnset(u8),
}

/// Rejected timer transitions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// A zero-length countdown was requested
    #[error("Invalid duration: {0} seconds (must be greater than zero)")]
    InvalidDuration(u32),

    /// Resume requested with no time left on the countdown
    #[error("Nothing to start: no time remaining")]
    NothingToStart,
}

/// Key-value persistence surface errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The storage surface cannot be reached at all
    #[error("Persistence unavailable: {0}")]
    Unavailable(String),

    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    /// Unknown key or value that does not fit the key's type
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
