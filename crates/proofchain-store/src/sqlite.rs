//! SQLite implementation of the BlockStore trait.
//!
//! This is the primary storage backend for Proofchain. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use proofchain_core::{now_millis, Block, BlockHash, ContentRecord, Fingerprint};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{BlockId, BlockStore, RecordPosition};

const BLOCK_COLUMNS: &str = "block_index, timestamp, previous_hash, nonce, hash, content";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime. Appends run in an immediate
/// transaction, so a block becomes visible only once it is committed.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path.as_ref())?;
        migration::migrate(&mut conn)?;
        tracing::debug!(path = %path.as_ref().display(), "opened sqlite block store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("sqlite connection: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

// Helper to encode content to CBOR
fn encode_content(content: &[ContentRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(content, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

// Helper to decode content from CBOR
fn decode_content(bytes: &[u8]) -> Result<Vec<ContentRecord>> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn blob_to_hash(bytes: Vec<u8>, column: &str) -> Result<BlockHash> {
    BlockHash::try_from(bytes.as_slice())
        .map_err(|_| StoreError::InvalidData(format!("{} is not 32 bytes", column)))
}

/// Raw column values of one `blocks` row.
struct BlockRow {
    index: i64,
    timestamp: i64,
    previous_hash: Vec<u8>,
    nonce: i64,
    hash: Vec<u8>,
    content: Vec<u8>,
}

impl BlockRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            index: row.get("block_index")?,
            timestamp: row.get("timestamp")?,
            previous_hash: row.get("previous_hash")?,
            nonce: row.get("nonce")?,
            hash: row.get("hash")?,
            content: row.get("content")?,
        })
    }

    fn into_block(self) -> Result<Block> {
        Ok(Block {
            index: self.index as u64,
            timestamp: self.timestamp,
            content: decode_content(&self.content)?,
            previous_hash: blob_to_hash(self.previous_hash, "previous_hash")?,
            nonce: self.nonce as u64,
            hash: blob_to_hash(self.hash, "hash")?,
        })
    }
}

fn query_blocks(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Block>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, BlockRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(BlockRow::into_block).collect()
}

fn query_block(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Option<Block>> {
    conn.query_row(sql, params, BlockRow::from_row)
        .optional()?
        .map(BlockRow::into_block)
        .transpose()
}

#[async_trait]
impl BlockStore for SqliteStore {
    async fn append(&self, block: &Block) -> Result<BlockId> {
        let block = block.clone();
        let content = encode_content(&block.content)?;

        self.run(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let expected: u64 =
                tx.query_row("SELECT COUNT(*) FROM blocks", [], |row| row.get::<_, i64>(0))? as u64;
            if block.index != expected {
                return Err(StoreError::Conflict {
                    expected,
                    got: block.index,
                });
            }

            let hash_taken: Option<i64> = tx
                .query_row(
                    "SELECT block_index FROM blocks WHERE hash = ?1",
                    params![block.hash.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            if hash_taken.is_some() {
                return Err(StoreError::DuplicateHash(block.hash));
            }

            tx.execute(
                "INSERT INTO blocks (
                    block_index, timestamp, previous_hash, nonce, hash, content, appended_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    block.index as i64,
                    block.timestamp,
                    block.previous_hash.as_bytes().as_slice(),
                    block.nonce as i64,
                    block.hash.as_bytes().as_slice(),
                    content,
                    now_millis(),
                ],
            )?;

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO block_content (fingerprint, block_index, position)
                     VALUES (?1, ?2, ?3)",
                )?;
                for (position, record) in block.content.iter().enumerate() {
                    stmt.execute(params![
                        record.fingerprint.as_bytes().as_slice(),
                        block.index as i64,
                        position as i64,
                    ])?;
                }
            }

            tx.commit()?;
            Ok(BlockId::from(&block))
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.run(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM blocks", [], |row| row.get(0))?;
            Ok(n as u64)
        })
        .await
    }

    async fn find_by_index(&self, index: u64) -> Result<Option<Block>> {
        self.run(move |conn| {
            query_block(
                conn,
                &format!("SELECT {} FROM blocks WHERE block_index = ?1", BLOCK_COLUMNS),
                params![index as i64],
            )
        })
        .await
    }

    async fn find_by_hash(&self, hash: &BlockHash) -> Result<Option<Block>> {
        let hash = *hash;
        self.run(move |conn| {
            query_block(
                conn,
                &format!("SELECT {} FROM blocks WHERE hash = ?1", BLOCK_COLUMNS),
                params![hash.as_bytes().as_slice()],
            )
        })
        .await
    }

    async fn tail(&self) -> Result<Option<Block>> {
        self.run(|conn| {
            query_block(
                conn,
                &format!(
                    "SELECT {} FROM blocks ORDER BY block_index DESC LIMIT 1",
                    BLOCK_COLUMNS
                ),
                [],
            )
        })
        .await
    }

    async fn iterate_ascending(&self) -> Result<Vec<Block>> {
        self.run(|conn| {
            query_blocks(
                conn,
                &format!("SELECT {} FROM blocks ORDER BY block_index", BLOCK_COLUMNS),
                [],
            )
        })
        .await
    }

    async fn find_range(&self, start: u64, end: u64) -> Result<Vec<Block>> {
        self.run(move |conn| {
            query_blocks(
                conn,
                &format!(
                    "SELECT {} FROM blocks WHERE block_index >= ?1 AND block_index <= ?2
                     ORDER BY block_index",
                    BLOCK_COLUMNS
                ),
                params![start as i64, end as i64],
            )
        })
        .await
    }

    async fn locate_fingerprint(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<RecordPosition>> {
        let fingerprint = *fingerprint;
        self.run(move |conn| {
            let found = conn
                .query_row(
                    "SELECT block_index, position FROM block_content
                     WHERE fingerprint = ?1
                     ORDER BY block_index, position LIMIT 1",
                    params![fingerprint.as_bytes().as_slice()],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;

            Ok(found.map(|(block_index, position)| RecordPosition {
                block_index: block_index as u64,
                position: position as usize,
            }))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofchain_core::{seal, BlockSkeleton, SealLimits};

    fn genesis() -> Block {
        let skeleton = BlockSkeleton::genesis();
        let sealed = seal(&skeleton, 1, &SealLimits::default()).unwrap();
        skeleton.into_block(sealed)
    }

    fn next(tail: &Block, fingerprints: &[u8]) -> Block {
        let content = fingerprints
            .iter()
            .map(|&n| {
                ContentRecord::from_parts(
                    format!("c-{}", n),
                    Fingerprint::from_bytes([n; 32]),
                    1_700_000_000_000 + n as i64,
                    format!("Title with \"quotes\" {}", n),
                    "author",
                )
            })
            .collect();
        let skeleton = BlockSkeleton::next(tail, content);
        let sealed = seal(&skeleton, 1, &SealLimits::default()).unwrap();
        skeleton.into_block(sealed)
    }

    #[tokio::test]
    async fn test_append_and_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let g = genesis();
        let b1 = next(&g, &[1, 2, 3]);

        store.append(&g).await.unwrap();
        let id = store.append(&b1).await.unwrap();
        assert_eq!(id, BlockId::from(&b1));

        // Every field survives storage exactly, so the digest still matches.
        let stored = store.find_by_index(1).await.unwrap().unwrap();
        assert_eq!(stored, b1);
        assert_eq!(stored.compute_hash().unwrap(), stored.hash);

        assert_eq!(store.find_by_hash(&b1.hash).await.unwrap(), Some(b1.clone()));
        assert_eq!(store.tail().await.unwrap(), Some(b1));
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_nonce_survives_full_u64_range() {
        let store = SqliteStore::open_memory().unwrap();
        let mut g = genesis();
        g.nonce = u64::MAX - 1;
        store.append(&g).await.unwrap();

        let stored = store.find_by_index(0).await.unwrap().unwrap();
        assert_eq!(stored.nonce, u64::MAX - 1);
    }

    #[tokio::test]
    async fn test_append_conflict() {
        let store = SqliteStore::open_memory().unwrap();
        let g = genesis();
        store.append(&g).await.unwrap();

        // Skipping an index is rejected.
        let b1 = next(&g, &[1]);
        let b2 = next(&b1, &[2]);
        let err = store.append(&b2).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { expected: 1, got: 2 }));

        // Re-appending an existing index is rejected.
        let err = store.append(&g).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { expected: 1, got: 0 }));

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_iterate_and_range() {
        let store = SqliteStore::open_memory().unwrap();
        let mut chain = vec![genesis()];
        for n in 1..=4u8 {
            let b = next(chain.last().unwrap(), &[n]);
            chain.push(b);
        }
        for b in &chain {
            store.append(b).await.unwrap();
        }

        assert_eq!(store.iterate_ascending().await.unwrap(), chain);

        let range = store.find_range(1, 3).await.unwrap();
        let indexes: Vec<u64> = range.iter().map(|b| b.index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_locate_fingerprint() {
        let store = SqliteStore::open_memory().unwrap();
        let g = genesis();
        let b1 = next(&g, &[5, 6]);
        store.append(&g).await.unwrap();
        store.append(&b1).await.unwrap();

        let pos = store
            .locate_fingerprint(&Fingerprint::from_bytes([6; 32]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pos.block_index, 1);
        assert_eq!(pos.position, 1);
    }

    #[tokio::test]
    async fn test_reopen_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let g = genesis();

        {
            let store = SqliteStore::open(&path).unwrap();
            store.append(&g).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.tail().await.unwrap(), Some(g));
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(32))]

        #[test]
        fn test_stored_block_keeps_its_digest(
            title in ".{0,40}",
            author in ".{0,20}",
            timestamp in proptest::prelude::any::<i64>(),
        ) {
            let g = genesis();
            let fingerprint = Fingerprint::from_bytes([1; 32]);
            let record = ContentRecord::from_parts("c", fingerprint, timestamp, title, author);
            let skeleton = BlockSkeleton::next(&g, vec![record]);
            let sealed = seal(&skeleton, 0, &SealLimits::default()).unwrap();
            let block = skeleton.into_block(sealed);

            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let stored = rt.block_on(async {
                let store = SqliteStore::open_memory().unwrap();
                store.append(&g).await.unwrap();
                store.append(&block).await.unwrap();
                store.find_by_index(1).await.unwrap().unwrap()
            });

            proptest::prop_assert_eq!(stored.compute_hash().unwrap(), block.hash);
            proptest::prop_assert_eq!(stored, block);
        }
    }
}
