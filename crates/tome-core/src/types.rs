//! Core domain types for Tome.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a document lineage (hash of the source path).
pub type DocId = String;

/// Fingerprint of a version's extracted text.
pub type ContentHash = String;

/// Generate a new unique record ID.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Kind of source document, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Office,
    Markdown,
    Text,
    Image,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Pdf => "pdf",
            SourceKind::Office => "office",
            SourceKind::Markdown => "markdown",
            SourceKind::Text => "text",
            SourceKind::Image => "image",
        }
    }

    /// Detect source kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(SourceKind::Pdf),
            // OOXML office formats
            "docx" | "pptx" | "xlsx" => Some(SourceKind::Office),
            "md" | "markdown" => Some(SourceKind::Markdown),
            "txt" | "csv" => Some(SourceKind::Text),
            "png" | "jpg" | "jpeg" => Some(SourceKind::Image),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role of a chunk within its document version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkRole {
    /// Whole-document summary produced by the segmentation pass.
    Summary,
    /// A semantically coherent slice of the document text.
    Chunk,
}

impl ChunkRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkRole::Summary => "summary",
            ChunkRole::Chunk => "chunk",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "summary" => Some(ChunkRole::Summary),
            "chunk" => Some(ChunkRole::Chunk),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChunkRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Page number or inclusive page range a chunk was derived from.
///
/// Rendered as `"3"` for a single page and `"2~5"` for a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePages {
    Single(u32),
    Range(u32, u32),
}

impl SourcePages {
    /// Build from an inclusive page interval, collapsing degenerate ranges.
    pub fn from_bounds(start: u32, end: u32) -> Self {
        if start == end {
            SourcePages::Single(start)
        } else {
            SourcePages::Range(start.min(end), start.max(end))
        }
    }

    /// First page covered.
    pub fn first(&self) -> u32 {
        match self {
            SourcePages::Single(p) => *p,
            SourcePages::Range(a, _) => *a,
        }
    }

    /// Last page covered.
    pub fn last(&self) -> u32 {
        match self {
            SourcePages::Single(p) => *p,
            SourcePages::Range(_, b) => *b,
        }
    }
}

impl std::fmt::Display for SourcePages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourcePages::Single(p) => write!(f, "{}", p),
            SourcePages::Range(a, b) => write!(f, "{}~{}", a, b),
        }
    }
}

impl FromStr for SourcePages {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_page = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| CoreError::InvalidPages(s.to_string()))
        };

        match s.split_once('~') {
            Some((a, b)) => Ok(SourcePages::from_bounds(parse_page(a)?, parse_page(b)?)),
            None => Ok(SourcePages::Single(parse_page(s)?)),
        }
    }
}

impl Serialize for SourcePages {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SourcePages {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Typed metadata attached to every stored chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub doc_id: DocId,
    pub content_hash: ContentHash,
    pub chunk_role: ChunkRole,
    pub path: String,
    pub file_name: String,
    pub source_pages: SourcePages,
    pub version: u32,
    pub is_latest: bool,
    pub last_modified: DateTime<Utc>,
}

impl ChunkMetadata {
    /// Validate required fields. Called at the metadata-manager boundary so
    /// downstream consumers can rely on well-formed records.
    pub fn validate(&self) -> CoreResult<()> {
        if self.doc_id.is_empty() {
            return Err(CoreError::InvalidMetadata("doc_id is empty".to_string()));
        }
        if self.content_hash.is_empty() {
            return Err(CoreError::InvalidMetadata(
                "content_hash is empty".to_string(),
            ));
        }
        if self.version == 0 {
            return Err(CoreError::InvalidMetadata(
                "version must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A chunk of document text together with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    /// Position within the chunk set; the summary chunk is seq 0.
    pub seq: u32,
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl ChunkRecord {
    pub fn new(seq: u32, content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            id: new_record_id(),
            seq,
            content: content.into(),
            metadata,
        }
    }
}

/// Per-version summary used by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub version: u32,
    pub content_hash: ContentHash,
    pub is_latest: bool,
}

/// An entry of the file-list manifest mirroring the store contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub doc_id: DocId,
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_from_extension() {
        assert_eq!(SourceKind::from_extension("pdf"), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::from_extension("DOCX"), Some(SourceKind::Office));
        assert_eq!(SourceKind::from_extension("md"), Some(SourceKind::Markdown));
        assert_eq!(SourceKind::from_extension("csv"), Some(SourceKind::Text));
        assert_eq!(SourceKind::from_extension("jpeg"), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_extension("exe"), None);
    }

    #[test]
    fn test_source_pages_rendering() {
        assert_eq!(SourcePages::Single(3).to_string(), "3");
        assert_eq!(SourcePages::Range(2, 5).to_string(), "2~5");
        assert_eq!(SourcePages::from_bounds(4, 4), SourcePages::Single(4));
    }

    #[test]
    fn test_source_pages_parse() {
        assert_eq!("7".parse::<SourcePages>().unwrap(), SourcePages::Single(7));
        assert_eq!(
            "2~9".parse::<SourcePages>().unwrap(),
            SourcePages::Range(2, 9)
        );
        assert!("two".parse::<SourcePages>().is_err());
    }

    #[test]
    fn test_metadata_validation() {
        let metadata = ChunkMetadata {
            doc_id: "abc".to_string(),
            content_hash: "def".to_string(),
            chunk_role: ChunkRole::Chunk,
            path: "/docs/contract.pdf".to_string(),
            file_name: "contract.pdf".to_string(),
            source_pages: SourcePages::Single(1),
            version: 1,
            is_latest: true,
            last_modified: Utc::now(),
        };
        assert!(metadata.validate().is_ok());

        let mut missing_hash = metadata.clone();
        missing_hash.content_hash.clear();
        assert!(missing_hash.validate().is_err());

        let mut zero_version = metadata;
        zero_version.version = 0;
        assert!(zero_version.validate().is_err());
    }
}
