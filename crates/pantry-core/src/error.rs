//! Error types for pantry.

use thiserror::Error;

/// Result type alias using pantry's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pantry operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External classifier failed or answered with an unusable payload
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A bounded wait on an external collaborator elapsed
    #[error("Timed out after {0} ms")]
    Timeout(u64),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Error::Request(format!("timed out: {}", e));
        }
        Error::Request(e.to_string())
    }
}
