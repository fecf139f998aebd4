//! Tome Core - Domain types for the document ingestion pipeline.
//!
//! This crate provides:
//! - Chunk records and typed chunk metadata
//! - Path-bound document identity and content fingerprints
//! - The pure version-reconciliation function

mod error;
mod identity;
mod metadata;
mod types;
mod versions;

pub use error::{CoreError, CoreResult};
pub use identity::{content_hash, doc_id_for_path};
pub use metadata::generate_metadata;
pub use types::*;
pub use versions::{reconcile_versions, Reconciliation};
