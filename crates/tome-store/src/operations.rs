//! Chunk store operations.

use crate::adapter::{DocumentStore, ScoredChunk, StoreStats};
use crate::database::SqliteStore;
use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::params;
use tome_core::{ChunkMetadata, ChunkRecord, ChunkRole, FileEntry, SourcePages, VersionRecord};
use tracing::debug;

const CHUNK_COLUMNS: &str = "id, doc_id, content_hash, chunk_role, seq, content, path, \
                             file_name, source_pages, version, is_latest, last_modified";

impl DocumentStore for SqliteStore {
    fn upsert(&self, chunks: &[ChunkRecord]) -> StoreResult<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        {
            // A latest chunk set supersedes every other version of its
            // document; the demotion happens in the same transaction as the
            // insert so readers never observe two latest versions.
            let mut demoted: Vec<(String, u32)> = Vec::new();
            for chunk in chunks.iter().filter(|c| c.metadata.is_latest) {
                let key = (chunk.metadata.doc_id.clone(), chunk.metadata.version);
                if !demoted.contains(&key) {
                    tx.execute(
                        "UPDATE chunks SET is_latest = 0 WHERE doc_id = ?1 AND version <> ?2",
                        params![key.0, key.1],
                    )?;
                    demoted.push(key);
                }
            }

            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO chunks
                    (id, doc_id, content_hash, chunk_role, seq, content, path,
                     file_name, source_pages, version, is_latest, last_modified)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
            )?;

            for chunk in chunks {
                let m = &chunk.metadata;
                stmt.execute(params![
                    chunk.id,
                    m.doc_id,
                    m.content_hash,
                    m.chunk_role.as_str(),
                    chunk.seq,
                    chunk.content,
                    m.path,
                    m.file_name,
                    m.source_pages.to_string(),
                    m.version,
                    m.is_latest as i32,
                    m.last_modified.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        debug!("Upserted {} chunks", chunks.len());
        Ok(chunks.len())
    }

    fn delete_document(&self, doc_id: &str) -> StoreResult<u64> {
        let conn = self.conn()?;
        let count = conn.execute("DELETE FROM chunks WHERE doc_id = ?1", params![doc_id])?;
        debug!("Deleted {} chunks for doc {}", count, doc_id);
        Ok(count as u64)
    }

    fn exists(&self, doc_id: &str, content_hash: &str) -> StoreResult<bool> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT 1 FROM chunks WHERE doc_id = ?1 AND content_hash = ?2 LIMIT 1",
            params![doc_id, content_hash],
            |_| Ok(()),
        );

        match result {
            Ok(()) => Ok(true),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
            Err(e) => Err(StoreError::from(e)),
        }
    }

    fn versions(&self, doc_id: &str) -> StoreResult<Vec<VersionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT version, MIN(content_hash), MAX(is_latest)
             FROM chunks WHERE doc_id = ?1
             GROUP BY version ORDER BY version",
        )?;

        let records = stmt.query_map(params![doc_id], |row| {
            Ok(VersionRecord {
                version: row.get(0)?,
                content_hash: row.get(1)?,
                is_latest: row.get::<_, i32>(2)? != 0,
            })
        })?;

        records
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    fn query(&self, text: &str, top_k: usize) -> StoreResult<Vec<ScoredChunk>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.doc_id, c.content_hash, c.chunk_role, c.seq, c.content,
                    c.path, c.file_name, c.source_pages, c.version, c.is_latest,
                    c.last_modified, -bm25(chunks_fts) AS score
             FROM chunks c
             INNER JOIN chunks_fts fts ON fts.rowid = c.rowid
             WHERE chunks_fts MATCH ?1 AND c.is_latest = 1
             ORDER BY score DESC
             LIMIT ?2",
        )?;

        let results = stmt.query_map(params![text, top_k as i64], |row| {
            let chunk = row_to_chunk(row)?;
            let score: f64 = row.get(12)?;
            Ok(ScoredChunk {
                content: chunk.content,
                metadata: chunk.metadata,
                score,
            })
        })?;

        results
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    fn documents(&self) -> StoreResult<Vec<FileEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT doc_id, MIN(file_name) FROM chunks
             WHERE is_latest = 1 GROUP BY doc_id ORDER BY 2",
        )?;

        let entries = stmt.query_map([], |row| {
            Ok(FileEntry {
                doc_id: row.get(0)?,
                filename: row.get(1)?,
            })
        })?;

        entries
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    fn stats(&self) -> StoreResult<StoreStats> {
        let conn = self.conn()?;
        let (total_documents, total_chunks, total_versions) = conn.query_row(
            "SELECT COUNT(DISTINCT doc_id),
                    COUNT(*),
                    COUNT(DISTINCT doc_id || ':' || version)
             FROM chunks",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(StoreStats {
            total_documents,
            total_chunks,
            total_versions,
        })
    }
}

impl SqliteStore {
    /// All chunks belonging to one version of a document, in seq order.
    pub fn chunks_for_version(&self, doc_id: &str, version: u32) -> StoreResult<Vec<ChunkRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CHUNK_COLUMNS} FROM chunks
             WHERE doc_id = ?1 AND version = ?2 ORDER BY seq",
        ))?;

        let chunks = stmt.query_map(params![doc_id, version], row_to_chunk)?;
        chunks
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    /// The latest-version chunks of a document, in seq order.
    pub fn latest_chunks(&self, doc_id: &str) -> StoreResult<Vec<ChunkRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CHUNK_COLUMNS} FROM chunks
             WHERE doc_id = ?1 AND is_latest = 1 ORDER BY seq",
        ))?;

        let chunks = stmt.query_map(params![doc_id], row_to_chunk)?;
        chunks
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }
}

fn row_to_chunk(row: &rusqlite::Row) -> rusqlite::Result<ChunkRecord> {
    let chunk_role_str: String = row.get(3)?;
    let source_pages_str: String = row.get(8)?;
    let last_modified_str: String = row.get(11)?;

    Ok(ChunkRecord {
        id: row.get(0)?,
        seq: row.get(4)?,
        content: row.get(5)?,
        metadata: ChunkMetadata {
            doc_id: row.get(1)?,
            content_hash: row.get(2)?,
            chunk_role: ChunkRole::from_str(&chunk_role_str).unwrap_or(ChunkRole::Chunk),
            path: row.get(6)?,
            file_name: row.get(7)?,
            source_pages: source_pages_str
                .parse::<SourcePages>()
                .unwrap_or(SourcePages::Single(1)),
            version: row.get(9)?,
            is_latest: row.get::<_, i32>(10)? != 0,
            last_modified: DateTime::parse_from_rfc3339(&last_modified_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        },
    })
}
