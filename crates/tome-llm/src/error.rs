//! Error types for text-generation operations.

use thiserror::Error;

/// Errors that can occur when calling the text-generation service.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Request timeout.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The requested model is not available.
    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    /// The generation server is not running.
    #[error("Text-generation server is not running at {host}")]
    ServerNotRunning { host: String },

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to start the async runtime backing the blocking client.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for text-generation operations.
pub type LlmResult<T> = Result<T, LlmError>;
