//! Store schema management.

use crate::error::StoreResult;
use rusqlite::Connection;
use tracing::info;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the store schema.
pub fn initialize_schema(conn: &Connection) -> StoreResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating initial store schema...");
        create_initial_schema(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating store from version {} to {}",
            current_version, SCHEMA_VERSION
        );
        run_migrations(conn, current_version)?;
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> StoreResult<i32> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> StoreResult<()> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

fn create_initial_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        -- Versioned chunk storage
        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            doc_id TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            chunk_role TEXT NOT NULL,
            seq INTEGER NOT NULL,
            content TEXT NOT NULL,
            path TEXT NOT NULL,
            file_name TEXT NOT NULL,
            source_pages TEXT NOT NULL,
            version INTEGER NOT NULL,
            is_latest INTEGER NOT NULL DEFAULT 1,
            last_modified TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_doc ON chunks(doc_id);
        CREATE INDEX IF NOT EXISTS idx_chunks_doc_hash ON chunks(doc_id, content_hash);
        CREATE INDEX IF NOT EXISTS idx_chunks_latest ON chunks(is_latest);

        -- Full-text search on chunks
        CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
            content,
            content='chunks',
            content_rowid='rowid'
        );

        -- Triggers to keep FTS in sync
        CREATE TRIGGER IF NOT EXISTS chunks_ai AFTER INSERT ON chunks BEGIN
            INSERT INTO chunks_fts(rowid, content) VALUES (NEW.rowid, NEW.content);
        END;

        CREATE TRIGGER IF NOT EXISTS chunks_ad AFTER DELETE ON chunks BEGIN
            INSERT INTO chunks_fts(chunks_fts, rowid, content) VALUES('delete', OLD.rowid, OLD.content);
        END;

        CREATE TRIGGER IF NOT EXISTS chunks_au AFTER UPDATE ON chunks BEGIN
            INSERT INTO chunks_fts(chunks_fts, rowid, content) VALUES('delete', OLD.rowid, OLD.content);
            INSERT INTO chunks_fts(rowid, content) VALUES (NEW.rowid, NEW.content);
        END;
        "#,
    )?;

    Ok(())
}

fn run_migrations(conn: &Connection, from_version: i32) -> StoreResult<()> {
    // Future migrations go here
    let _ = from_version;

    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}
