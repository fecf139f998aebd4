//! Tome Ingest - The document ingestion coordinator.
//!
//! This crate provides:
//! - LLM-assisted semantic chunking with coverage verification
//! - The per-file ingestion pipeline (extract, sanitize, chunk, version,
//!   upsert) and its symmetric deletion flow
//! - Directory watching with batched change detection
//! - A supervisor owning the watch worker and its stop signal

mod chunker;
mod error;
mod pipeline;
mod supervisor;
mod watcher;

pub use chunker::{
    assemble_pages, DocumentText, PageSpan, SegmentedChunk, SegmentedDocument, SemanticChunker,
};
pub use error::{IngestError, IngestResult};
pub use pipeline::{IngestOutcome, IngestPipeline};
pub use supervisor::{process_batch, PendingBatch, WatchStatus, WatchSupervisor};
pub use watcher::{scan_directory, DirWatcher, WatchEvent, WatcherConfig};
