//! Error types for the document hooks.

use thiserror::Error;

/// Main error type for hook operations.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("Missing identifier: a new document needs an id")]
    MissingIdentifier,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for HookError {
    fn from(e: serde_json::Error) -> Self {
        HookError::Deserialization(e.to_string())
    }
}

/// Result type for hook operations.
pub type Result<T> = std::result::Result<T, HookError>;
