//! Core error types for pawfocus-core.
//!
//! Every failure here is local and user-facing. Nothing is retried: an error
//! aborts the current operation and leaves state untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pawfocus-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage backend errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Donation hand-off errors
    #[error("{0}")]
    Donation(#[from] DonationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a key-value backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Settings errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Settings cannot change while a session is counting down
    #[error("Settings cannot be changed while a session is running")]
    SessionRunning,

    /// Key is not a known setting
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse an imported settings document
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Donation recorder errors. Both leave the ledger untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DonationError {
    /// The shelter URL is empty or still the placeholder
    #[error("No shelter donation link configured; set one with `config set shelter.url <url>`")]
    ShelterNotConfigured,

    /// Outstanding pledge is zero
    #[error("Nothing to donate yet; finish a focus session to earn treats")]
    NothingToDonate,
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg)
                if code.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StorageError::Locked
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
