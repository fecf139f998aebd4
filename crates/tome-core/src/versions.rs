//! Version reconciliation for document lineages.
//!
//! Reconciliation is a pure function over the existing version records of a
//! `doc_id`: it never mutates its input and returns the updated collection
//! alongside the decision, so callers apply the change to the store as one
//! atomic write.

use crate::types::{ContentHash, VersionRecord};

/// Outcome of reconciling a new submission against a document's versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The submission's content hash matches an existing version; nothing
    /// to write.
    Duplicate,
    /// The submission becomes the new latest version.
    Inserted { version: u32 },
}

/// Reconcile a new content fingerprint against the existing versions of one
/// `doc_id`.
///
/// - No existing versions: the submission is inserted as version 1.
/// - Any existing version with the same `content_hash`: the submission is a
///   pure duplicate and the existing records are returned unchanged.
/// - Otherwise: every previously-latest record is flipped to
///   `is_latest = false` and the submission is appended at
///   `max_version + 1, is_latest = true`.
pub fn reconcile_versions(
    existing: &[VersionRecord],
    new_content_hash: &ContentHash,
) -> (Vec<VersionRecord>, Reconciliation) {
    if existing.is_empty() {
        let inserted = VersionRecord {
            version: 1,
            content_hash: new_content_hash.clone(),
            is_latest: true,
        };
        return (vec![inserted], Reconciliation::Inserted { version: 1 });
    }

    if existing
        .iter()
        .any(|record| record.content_hash == *new_content_hash)
    {
        return (existing.to_vec(), Reconciliation::Duplicate);
    }

    let max_version = existing.iter().map(|record| record.version).max().unwrap_or(0);
    let next = max_version + 1;

    let mut updated: Vec<VersionRecord> = existing
        .iter()
        .map(|record| VersionRecord {
            is_latest: false,
            ..record.clone()
        })
        .collect();

    updated.push(VersionRecord {
        version: next,
        content_hash: new_content_hash.clone(),
        is_latest: true,
    });

    (updated, Reconciliation::Inserted { version: next })
}
