//! Error types for planwise-core

use thiserror::Error;

/// Main error type for the planwise-core library
///
/// Parse misses are never errors: every extractor has a fallback value.
/// These variants cover the edges (store, remote service, config) and
/// date arithmetic that ran off the calendar.
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Finance intent service error (transport, status or payload)
    #[error("intent service error: {0}")]
    IntentService(String),

    /// Date arithmetic overflowed the supported calendar range
    #[error("date out of range: {0}")]
    DateOutOfRange(String),

    /// Event not found
    #[error("event not found: {0}")]
    EventNotFound(String),
}

/// Result type alias for planwise-core
pub type Result<T> = std::result::Result<T, Error>;
