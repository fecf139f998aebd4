//! Metadata generation for stored chunks.

use crate::error::CoreResult;
use crate::types::{ChunkMetadata, ChunkRole, SourcePages};
use chrono::Utc;

/// Build validated metadata for one chunk of a document version.
///
/// `doc_id` and `content_hash` are supplied by the caller so that every
/// chunk of one ingestion pass shares the same identity and fingerprint.
pub fn generate_metadata(
    doc_id: impl Into<String>,
    content_hash: impl Into<String>,
    path: &str,
    chunk_role: ChunkRole,
    source_pages: SourcePages,
    version: u32,
    is_latest: bool,
) -> CoreResult<ChunkMetadata> {
    let file_name = path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .to_string();

    let metadata = ChunkMetadata {
        doc_id: doc_id.into(),
        content_hash: content_hash.into(),
        chunk_role,
        path: path.to_string(),
        file_name,
        source_pages,
        version,
        is_latest,
        last_modified: Utc::now(),
    };

    metadata.validate()?;
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{content_hash, doc_id_for_path};

    #[test]
    fn test_generate_metadata() {
        let path = "/data/reports/annual.pdf";
        let metadata = generate_metadata(
            doc_id_for_path(path),
            content_hash("report body"),
            path,
            ChunkRole::Chunk,
            SourcePages::Range(2, 4),
            1,
            true,
        )
        .unwrap();

        assert_eq!(metadata.file_name, "annual.pdf");
        assert_eq!(metadata.source_pages.to_string(), "2~4");
        assert!(metadata.is_latest);
    }

    #[test]
    fn test_empty_identity_is_rejected() {
        let result = generate_metadata(
            "",
            content_hash("body"),
            "/data/a.txt",
            ChunkRole::Summary,
            SourcePages::Single(1),
            1,
            true,
        );
        assert!(result.is_err());
    }
}
