//! File-list manifest mirroring the store contents.
//!
//! The manifest is a JSON array of `{doc_id, filename}` records consumed by
//! front-ends. It is a cache: it can be regenerated at any time purely from
//! the store's unique `doc_id` set and is rewritten after every mutating
//! batch.

use crate::adapter::DocumentStore;
use crate::error::StoreResult;
use std::path::Path;
use tome_core::FileEntry;
use tracing::debug;

/// Regenerate the manifest file from the store and return the entries.
pub fn write_manifest(store: &dyn DocumentStore, path: &Path) -> StoreResult<Vec<FileEntry>> {
    let entries = store.documents()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(path, json)?;

    debug!("Wrote manifest with {} entries to {}", entries.len(), path.display());
    Ok(entries)
}

/// Load the manifest file; an absent file yields an empty list.
pub fn load_manifest(path: &Path) -> StoreResult<Vec<FileEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path)?;
    let entries: Vec<FileEntry> = serde_json::from_str(&contents)?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteStore;
    use tome_core::{
        content_hash, doc_id_for_path, generate_metadata, ChunkRecord, ChunkRole, SourcePages,
    };

    fn store_with_doc(path: &str) -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        let metadata = generate_metadata(
            doc_id_for_path(path),
            content_hash("body"),
            path,
            ChunkRole::Chunk,
            SourcePages::Single(1),
            1,
            true,
        )
        .unwrap();
        store
            .upsert(&[ChunkRecord::new(1, "body", metadata)])
            .unwrap();
        store
    }

    #[test]
    fn test_manifest_roundtrip() {
        let store = store_with_doc("/docs/contract.pdf");
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("file_list.json");

        let written = write_manifest(&store, &manifest_path).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].filename, "contract.pdf");

        let loaded = load_manifest(&manifest_path).unwrap();
        assert_eq!(loaded, written);
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_manifest(&dir.path().join("missing.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_manifest_regenerates_from_store() {
        let store = store_with_doc("/docs/contract.pdf");
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("file_list.json");

        // A stale manifest is fully replaced by store contents.
        std::fs::write(&manifest_path, r#"[{"doc_id":"stale","filename":"gone.pdf"}]"#).unwrap();
        let written = write_manifest(&store, &manifest_path).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].doc_id, doc_id_for_path("/docs/contract.pdf"));
    }
}
