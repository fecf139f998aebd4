//! The store adapter contract consumed by the ingestion pipeline.

use crate::error::StoreResult;
use tome_core::{ChunkMetadata, ChunkRecord, FileEntry, VersionRecord};

/// A chunk returned from a text query, with its relevance score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
    pub score: f64,
}

/// Aggregate counts over the store.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub total_documents: i64,
    pub total_chunks: i64,
    pub total_versions: i64,
}

/// Idempotent upsert/delete/query interface to the persistent chunk store.
///
/// All mutations are keyed by `doc_id` (and `content_hash` for dedup) so
/// that concurrent writers converge. Inserting a latest chunk set demotes
/// the document's previously-latest rows within the same transaction; that
/// per-key atomicity is the only cross-process consistency guarantee.
pub trait DocumentStore: Send + Sync {
    /// Insert a chunk set. Chunks marked `is_latest` demote every other
    /// version of the same `doc_id` atomically.
    fn upsert(&self, chunks: &[ChunkRecord]) -> StoreResult<usize>;

    /// Remove every version sharing this `doc_id`. Returns the number of
    /// chunks deleted.
    fn delete_document(&self, doc_id: &str) -> StoreResult<u64>;

    /// Whether any stored chunk carries this `(doc_id, content_hash)` pair.
    fn exists(&self, doc_id: &str, content_hash: &str) -> StoreResult<bool>;

    /// Per-version summaries for a document, ordered by version ascending.
    fn versions(&self, doc_id: &str) -> StoreResult<Vec<VersionRecord>>;

    /// Full-text query over latest-version chunks.
    fn query(&self, text: &str, top_k: usize) -> StoreResult<Vec<ScoredChunk>>;

    /// Unique documents currently in the store (one entry per `doc_id`).
    fn documents(&self) -> StoreResult<Vec<FileEntry>>;

    /// Aggregate store statistics.
    fn stats(&self) -> StoreResult<StoreStats>;
}
