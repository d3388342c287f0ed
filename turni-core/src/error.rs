//! Error types for turni.

use thiserror::Error;

use crate::access::Permission;

/// Errors that can occur in turni operations.
#[derive(Error, Debug)]
pub enum TurniError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Roster error: {0}")]
    Roster(String),

    #[error("User error: {0}")]
    User(String),

    #[error("Permission denied: '{0}' is required")]
    PermissionDenied(Permission),

    #[error("{provider} rejected the message: {message}")]
    Notification { provider: String, message: String },

    #[error("Invalid phone number for {0}. Expected format: +393331234567")]
    InvalidPhone(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<serde_json::Error> for TurniError {
    fn from(err: serde_json::Error) -> Self {
        TurniError::Serialization(err.to_string())
    }
}

/// Result type alias for turni operations.
pub type TurniResult<T> = Result<T, TurniError>;
