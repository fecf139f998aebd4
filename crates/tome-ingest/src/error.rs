//! Error types for the ingestion pipeline.

use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction error: {0}")]
    Extract(#[from] tome_extract::ExtractError),

    #[error("Store error: {0}")]
    Store(#[from] tome_store::StoreError),

    #[error("Metadata error: {0}")]
    Core(#[from] tome_core::CoreError),

    #[error("Segmentation failed after {attempts} attempt(s): {reason}")]
    SegmentationFailed { attempts: u32, reason: String },

    #[error("Watch error: {0}")]
    WatchError(String),
}
