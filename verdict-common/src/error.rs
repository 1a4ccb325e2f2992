//! Common error types for Verdict

use thiserror::Error;

/// Common result type for Verdict operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the store, config and service layers
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite backend failure
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data directory or file access failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unreadable or invalid TOML config
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown topic or entry
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected input, e.g. an id that cannot name a file
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
