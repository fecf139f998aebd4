//! Error types for content extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur during content extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Parse error for {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Tool not found: {tool}. Please install it.")]
    ToolNotFound { tool: String },

    #[error("OCR error: {0}")]
    OcrError(String),
}
