//! In-memory implementation of the BlockStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use proofchain_core::{Block, BlockHash, Fingerprint};

use crate::error::{Result, StoreError};
use crate::traits::{BlockId, BlockStore, RecordPosition};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; an
/// append takes the write lock once, so readers see a block either fully or
/// not at all.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Blocks, position == index.
    blocks: Vec<Block>,

    /// Hash index: hash -> block index.
    by_hash: HashMap<BlockHash, u64>,

    /// Fingerprint index: first occurrence of each fingerprint.
    fingerprints: HashMap<Fingerprint, RecordPosition>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    /// Overwrite a stored block in place.
    ///
    /// Bypasses the append-only contract. Exists so tests can simulate a
    /// corrupted store and exercise the validator.
    #[doc(hidden)]
    pub fn tamper<F>(&self, index: u64, f: F) -> Result<()>
    where
        F: FnOnce(&mut Block),
    {
        let mut inner = self.write()?;
        let block = inner
            .blocks
            .get_mut(index as usize)
            .ok_or_else(|| StoreError::InvalidData(format!("no block at index {}", index)))?;
        f(block);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockStore for MemoryStore {
    async fn append(&self, block: &Block) -> Result<BlockId> {
        let mut inner = self.write()?;

        let expected = inner.blocks.len() as u64;
        if block.index != expected {
            return Err(StoreError::Conflict {
                expected,
                got: block.index,
            });
        }

        if inner.by_hash.contains_key(&block.hash) {
            return Err(StoreError::DuplicateHash(block.hash));
        }

        for (position, record) in block.content.iter().enumerate() {
            inner
                .fingerprints
                .entry(record.fingerprint)
                .or_insert(RecordPosition {
                    block_index: block.index,
                    position,
                });
        }
        inner.by_hash.insert(block.hash, block.index);
        inner.blocks.push(block.clone());

        Ok(BlockId::from(block))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.read()?.blocks.len() as u64)
    }

    async fn find_by_index(&self, index: u64) -> Result<Option<Block>> {
        Ok(self.read()?.blocks.get(index as usize).cloned())
    }

    async fn find_by_hash(&self, hash: &BlockHash) -> Result<Option<Block>> {
        let inner = self.read()?;
        Ok(inner
            .by_hash
            .get(hash)
            .and_then(|&index| inner.blocks.get(index as usize))
            .cloned())
    }

    async fn tail(&self) -> Result<Option<Block>> {
        Ok(self.read()?.blocks.last().cloned())
    }

    async fn iterate_ascending(&self) -> Result<Vec<Block>> {
        Ok(self.read()?.blocks.clone())
    }

    async fn find_range(&self, start: u64, end: u64) -> Result<Vec<Block>> {
        let inner = self.read()?;
        Ok(inner
            .blocks
            .iter()
            .filter(|b| b.index >= start && b.index <= end)
            .cloned()
            .collect())
    }

    async fn locate_fingerprint(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<RecordPosition>> {
        Ok(self.read()?.fingerprints.get(fingerprint).copied())
    }
}
