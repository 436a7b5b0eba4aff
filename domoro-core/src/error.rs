//! Error types for domoro-core

use thiserror::Error;

/// Main error type for the domoro-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error (a failed save surfaces here; the caller may retry)
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Bad parameters passed to `Tracker::start`
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Tracker operation called from an incompatible state
    #[error("cannot {operation} while tracker is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

/// Result type alias for domoro-core
pub type Result<T> = std::result::Result<T, Error>;
