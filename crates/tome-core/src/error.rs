//! Error types for core domain operations.

use thiserror::Error;

/// Core error type for Tome domain operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Invalid page specification: {0}")]
    InvalidPages(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using Tome's core error.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}
