//! Schema versions for the SQLite block store.
//!
//! Each entry of [`MIGRATIONS`] moves the schema from version N-1 to N and is
//! applied at most once, recorded in `schema_migrations`.

use rusqlite::{params, Connection};

use crate::error::{Result, StoreError};

/// Ordered schema migrations; the version is the position plus one.
const MIGRATIONS: &[&str] = &[V1_BLOCKS];

/// Current schema version.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// v1: blocks plus a fingerprint lookup table.
const V1_BLOCKS: &str = r#"
    -- One row per sealed block, append-only
    CREATE TABLE blocks (
        block_index INTEGER PRIMARY KEY,  -- contiguous from 0
        timestamp INTEGER NOT NULL,       -- creation time (Unix ms)
        previous_hash BLOB NOT NULL,      -- 32 bytes, zero for genesis
        nonce INTEGER NOT NULL,           -- u64 stored bit-for-bit as i64
        hash BLOB NOT NULL UNIQUE,        -- 32 bytes, SHA-256 block digest
        content BLOB NOT NULL,            -- CBOR array of content records
        appended_at INTEGER NOT NULL      -- local time of append
    );

    -- Where each record landed
    CREATE TABLE block_content (
        fingerprint BLOB NOT NULL,        -- 32 bytes
        block_index INTEGER NOT NULL REFERENCES blocks(block_index),
        position INTEGER NOT NULL,
        PRIMARY KEY (block_index, position)
    );

    CREATE INDEX idx_block_content_fingerprint ON block_content(fingerprint);
"#;

/// Bring the schema up to [`CURRENT_VERSION`].
///
/// Safe to call on every open. A database written by a newer build is
/// refused rather than downgraded.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
    )?;

    let applied: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if applied > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "schema version {} is newer than this build supports ({})",
            applied, CURRENT_VERSION
        )));
    }

    let tx = conn.transaction()?;
    for (version, sql) in (1u32..).zip(MIGRATIONS).skip(applied as usize) {
        tx.execute_batch(sql)
            .map_err(|e| StoreError::Migration(format!("v{}: {}", version, e)))?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            params![version, proofchain_core::now_millis()],
        )?;
        tracing::debug!(version, "applied schema migration");
    }
    tx.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"blocks".to_string()));
        assert!(tables.contains(&"block_content".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_migration_rejects_newer_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, 0)",
            rusqlite::params![CURRENT_VERSION + 1],
        )
        .unwrap();

        assert!(matches!(migrate(&mut conn), Err(StoreError::Migration(_))));
    }
}
