//! Document identity and content fingerprints.
//!
//! Identity is path-bound: the same source path always yields the same
//! `doc_id`, across every version of the document. Content fingerprints are
//! computed over the final sanitized text of one ingestion pass.

use crate::types::{ContentHash, DocId};
use sha2::{Digest, Sha256};

/// Derive the stable document identity from its source path.
///
/// Never recomputed from content; a moved or renamed file starts a new
/// lineage.
pub fn doc_id_for_path(path: &str) -> DocId {
    hex_digest(path.as_bytes())
}

/// Fingerprint the extracted (post-OCR, post-sanitization) text of a
/// document version.
pub fn content_hash(text: &str) -> ContentHash {
    hex_digest(text.as_bytes())
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
