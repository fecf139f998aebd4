//! Per-file ingestion pipeline.
//!
//! One file either ingests fully (summary and every chunk upserted in a
//! single store transaction) or not at all; there is no partial chunk set to
//! observe. Deletion is symmetric: the path resolves to its `doc_id` and
//! every version is removed.

use crate::chunker::{assemble_pages, SemanticChunker, SegmentedDocument};
use crate::error::IngestResult;
use std::path::Path;
use std::sync::Arc;
use tome_config::Config;
use tome_core::{
    content_hash, doc_id_for_path, generate_metadata, reconcile_versions, ChunkRecord, ChunkRole,
    Reconciliation,
};
use tome_extract::ContentExtractor;
use tome_llm::TextGenerator;
use tome_store::DocumentStore;
use tracing::{debug, info};

/// Result of pushing one file through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new version was stored.
    Stored { version: u32, chunk_count: usize },
    /// The file's content matches a stored version; nothing was written.
    Duplicate,
    /// Extraction produced no usable text; nothing was written.
    SkippedEmpty,
}

/// Drives extraction, chunking, versioning, and the store write for single
/// files.
pub struct IngestPipeline {
    extractor: ContentExtractor,
    generator: Box<dyn TextGenerator>,
    chunking: tome_config::ChunkingConfig,
    store: Arc<dyn DocumentStore>,
}

impl IngestPipeline {
    pub fn new(
        config: &Config,
        generator: Box<dyn TextGenerator>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            extractor: ContentExtractor::new(config.extraction.clone()),
            generator,
            chunking: config.chunking.clone(),
            store,
        }
    }

    /// Ingest a single file.
    ///
    /// The watch path is used as-is for identity (a deleted file cannot be
    /// canonicalized, and ingest and delete must agree on `doc_id`).
    pub fn ingest_file(&self, path: &Path) -> IngestResult<IngestOutcome> {
        let path_str = path.to_string_lossy().to_string();
        info!("Ingesting file: {}", path_str);

        let pages = self.extractor.extract(path)?;
        if pages.iter().all(|page| page.text.trim().is_empty()) {
            debug!("No usable text in {}", path_str);
            return Ok(IngestOutcome::SkippedEmpty);
        }

        let doc = assemble_pages(&pages);
        let doc_id = doc_id_for_path(&path_str);
        let hash = content_hash(&doc.text);

        // Reconcile before the expensive segmentation round-trip: an
        // unchanged file is a no-op.
        let existing = self.store.versions(&doc_id)?;
        let (_, reconciliation) = reconcile_versions(&existing, &hash);
        let version = match reconciliation {
            Reconciliation::Duplicate => {
                debug!("Content of {} matches stored version, skipping", path_str);
                return Ok(IngestOutcome::Duplicate);
            }
            Reconciliation::Inserted { version } => version,
        };

        let chunker = SemanticChunker::new(self.generator.as_ref(), self.chunking.clone());
        let segmented = chunker.segment(&doc)?;

        let records = self.build_records(&doc_id, &hash, &path_str, &segmented, version)?;

        // Belt-and-suspenders against concurrent double-ingestion: only
        // chunks absent from the store are upserted, even though
        // reconciliation already judged this a new version.
        let mut to_upsert = Vec::with_capacity(records.len());
        for record in records {
            if self
                .store
                .exists(&record.metadata.doc_id, &record.metadata.content_hash)?
            {
                debug!("Chunk already stored for {}, skipping", path_str);
                continue;
            }
            to_upsert.push(record);
        }

        if to_upsert.is_empty() {
            return Ok(IngestOutcome::Duplicate);
        }

        let chunk_count = self.store.upsert(&to_upsert)?;
        info!(
            "Stored {} chunks for {} as version {}",
            chunk_count, path_str, version
        );

        Ok(IngestOutcome::Stored {
            version,
            chunk_count,
        })
    }

    /// Remove every stored version of the document at this path.
    pub fn delete_file(&self, path: &Path) -> IngestResult<u64> {
        let path_str = path.to_string_lossy().to_string();
        let doc_id = doc_id_for_path(&path_str);

        let removed = self.store.delete_document(&doc_id)?;
        info!("Removed {} chunks for deleted file {}", removed, path_str);
        Ok(removed)
    }

    /// The store this pipeline writes to.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    fn build_records(
        &self,
        doc_id: &str,
        hash: &str,
        path_str: &str,
        segmented: &SegmentedDocument,
        version: u32,
    ) -> IngestResult<Vec<ChunkRecord>> {
        let mut records = Vec::with_capacity(segmented.chunks.len() + 1);

        let summary_metadata = generate_metadata(
            doc_id,
            hash,
            path_str,
            ChunkRole::Summary,
            segmented.summary.source_pages,
            version,
            true,
        )?;
        records.push(ChunkRecord::new(0, &segmented.summary.content, summary_metadata));

        for (i, chunk) in segmented.chunks.iter().enumerate() {
            let metadata = generate_metadata(
                doc_id,
                hash,
                path_str,
                ChunkRole::Chunk,
                chunk.source_pages,
                version,
                true,
            )?;
            records.push(ChunkRecord::new((i + 1) as u32, &chunk.content, metadata));
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tome_llm::LlmResult;
    use tome_store::SqliteStore;

    /// Generator that segments any document into one full-range chunk.
    struct WholeTextGenerator {
        calls: Arc<Mutex<u32>>,
    }

    impl WholeTextGenerator {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(0)),
            }
        }

        fn call_counter(&self) -> Arc<Mutex<u32>> {
            Arc::clone(&self.calls)
        }
    }

    impl TextGenerator for WholeTextGenerator {
        fn generate(&self, prompt: &str, _system: &str) -> LlmResult<String> {
            *self.calls.lock().unwrap() += 1;

            // The prompt states the total length; echo a single chunk
            // covering it.
            let total: usize = prompt
                .lines()
                .find_map(|line| {
                    line.strip_prefix("# Original Data (Text Length: ")
                        .and_then(|rest| rest.trim_end_matches(')').parse().ok())
                })
                .unwrap_or(0);

            Ok(serde_json::json!({
                "summary": { "content": "A short summary." },
                "chunks": [
                    { "id": 1, "content_range": [0, total], "reasoning": "whole text" }
                ],
            })
            .to_string())
        }
    }

    fn pipeline_with_store() -> (IngestPipeline, Arc<dyn DocumentStore>) {
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let pipeline = IngestPipeline::new(
            &Config::default(),
            Box::new(WholeTextGenerator::new()),
            Arc::clone(&store),
        );
        (pipeline, store)
    }

    #[test]
    fn test_ingest_stores_summary_and_chunks() {
        let (pipeline, store) = pipeline_with_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "A document body that is worth chunking.").unwrap();

        let outcome = pipeline.ingest_file(&path).unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::Stored {
                version: 1,
                chunk_count: 2
            }
        );

        let doc_id = doc_id_for_path(&path.to_string_lossy());
        let versions = store.versions(&doc_id).unwrap();
        assert_eq!(versions.len(), 1);
        assert!(versions[0].is_latest);
    }

    #[test]
    fn test_reingest_unchanged_file_is_noop() {
        let (pipeline, store) = pipeline_with_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "A document body that is worth chunking.").unwrap();

        pipeline.ingest_file(&path).unwrap();
        let second = pipeline.ingest_file(&path).unwrap();
        assert_eq!(second, IngestOutcome::Duplicate);

        let doc_id = doc_id_for_path(&path.to_string_lossy());
        assert_eq!(store.versions(&doc_id).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_detected_before_segmentation() {
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let generator = WholeTextGenerator::new();
        let calls = generator.call_counter();
        let pipeline =
            IngestPipeline::new(&Config::default(), Box::new(generator), Arc::clone(&store));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "A document body that is worth chunking.").unwrap();

        pipeline.ingest_file(&path).unwrap();
        pipeline.ingest_file(&path).unwrap();

        // The second ingest never reached the generation service.
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_edited_file_creates_second_version() {
        let (pipeline, store) = pipeline_with_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contract.txt");

        std::fs::write(&path, "The original contract terms.").unwrap();
        pipeline.ingest_file(&path).unwrap();

        std::fs::write(&path, "The amended contract terms, now different.").unwrap();
        let outcome = pipeline.ingest_file(&path).unwrap();
        assert!(matches!(
            outcome,
            IngestOutcome::Stored { version: 2, .. }
        ));

        let doc_id = doc_id_for_path(&path.to_string_lossy());
        let versions = store.versions(&doc_id).unwrap();
        assert_eq!(versions.len(), 2);
        assert!(!versions[0].is_latest);
        assert!(versions[1].is_latest);
        assert_eq!(versions[1].version, 2);
    }

    #[test]
    fn test_delete_removes_all_versions() {
        let (pipeline, store) = pipeline_with_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contract.txt");

        std::fs::write(&path, "The original contract terms.").unwrap();
        pipeline.ingest_file(&path).unwrap();
        std::fs::write(&path, "The amended contract terms, now different.").unwrap();
        pipeline.ingest_file(&path).unwrap();

        std::fs::remove_file(&path).unwrap();
        let removed = pipeline.delete_file(&path).unwrap();
        assert_eq!(removed, 4);

        let doc_id = doc_id_for_path(&path.to_string_lossy());
        assert!(store.versions(&doc_id).unwrap().is_empty());
    }

    #[test]
    fn test_empty_file_is_skipped() {
        let (pipeline, store) = pipeline_with_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "   \n  ").unwrap();

        let outcome = pipeline.ingest_file(&path).unwrap();
        assert_eq!(outcome, IngestOutcome::SkippedEmpty);
        assert_eq!(store.stats().unwrap().total_chunks, 0);
    }

    #[test]
    fn test_unsupported_extension_propagates() {
        let (pipeline, _) = pipeline_with_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.exe");
        std::fs::write(&path, "x").unwrap();

        assert!(pipeline.ingest_file(&path).is_err());
    }
}
