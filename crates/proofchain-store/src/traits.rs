//! BlockStore trait: the abstract interface for block persistence.
//!
//! This trait keeps the ledger storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use proofchain_core::{Block, BlockHash, Fingerprint};

use crate::error::Result;

/// Identity of an appended block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub index: u64,
    pub hash: BlockHash,
}

impl From<&Block> for BlockId {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index,
            hash: block.hash,
        }
    }
}

/// Where a fingerprint sits in the stored chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPosition {
    /// Index of the block holding the record.
    pub block_index: u64,
    /// Position of the record within the block's content.
    pub position: usize,
}

/// The BlockStore trait: async interface for block persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Append-only**: blocks are never updated or deleted.
/// - **Append-if-tail**: `append` only succeeds when `block.index` equals the
///   current block count. A writer holding a stale tail gets
///   [`StoreError::Conflict`](crate::StoreError::Conflict) and nothing is written.
/// - **Atomic visibility**: readers never observe a partially appended block.
/// - **No validation**: the store does not check hashes or links; that is the
///   validator's job.
#[async_trait]
pub trait BlockStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Write
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a sealed block at the tail.
    async fn append(&self, block: &Block) -> Result<BlockId>;

    // ─────────────────────────────────────────────────────────────────────────
    // Read
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of stored blocks.
    async fn count(&self) -> Result<u64>;

    /// Get a block by its index.
    async fn find_by_index(&self, index: u64) -> Result<Option<Block>>;

    /// Get a block by its hash.
    async fn find_by_hash(&self, hash: &BlockHash) -> Result<Option<Block>>;

    /// The block with the highest index.
    async fn tail(&self) -> Result<Option<Block>>;

    /// All blocks, ordered by index.
    async fn iterate_ascending(&self) -> Result<Vec<Block>>;

    /// Blocks with `start <= index <= end`, ordered by index.
    async fn find_range(&self, start: u64, end: u64) -> Result<Vec<Block>>;

    /// First stored occurrence of a content fingerprint.
    async fn locate_fingerprint(&self, fingerprint: &Fingerprint)
        -> Result<Option<RecordPosition>>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: BlockStore {
    /// Whether no block (not even genesis) has been stored.
    fn is_empty(&self) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Total number of content records across all stored blocks.
    fn record_count(&self) -> impl std::future::Future<Output = Result<u64>> + Send;
}

impl<S: BlockStore + ?Sized> StoreExt for S {
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.count().await? == 0)
    }

    async fn record_count(&self) -> Result<u64> {
        let blocks = self.iterate_ascending().await?;
        Ok(blocks.iter().map(|b| b.content.len() as u64).sum())
    }
}
