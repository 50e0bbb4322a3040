//! The Ledger: batches content records into proof-of-work sealed blocks.
//!
//! The Ledger owns the pending buffer and is the only writer to its store.
//! Every mutating operation runs under one async mutex; the nonce search runs
//! on the blocking pool while that mutex is held.
//!
//! A seal, once it has drained the buffer, runs on its own task that owns the
//! lock. Dropping the caller's future does not stop it: the records end up
//! in a stored block or back in the buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinError;

use proofchain_core::{
    seal_with_cancel, validate_chain, Block, BlockHash, BlockSkeleton, ContentRecord, Fingerprint,
    PendingBuffer, PowError, SealLimits,
};
use proofchain_store::{BlockStore, StoreError, StoreExt};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};

/// What happened to a submitted record.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The record is waiting for the next block.
    Buffered {
        /// Records now pending, including this one.
        pending: usize,
    },
    /// The record reached the threshold and was sealed into this block.
    Sealed(Block),
    /// The threshold was reached but sealing failed; every record stays
    /// pending and the next submit or seal retries.
    SealDeferred {
        pending: usize,
        error: LedgerError,
    },
}

impl SubmitOutcome {
    /// The sealed block, if this submit produced one.
    pub fn block(&self) -> Option<&Block> {
        match self {
            SubmitOutcome::Sealed(block) => Some(block),
            _ => None,
        }
    }
}

/// Where a chained record sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentLocation {
    pub block_index: u64,
    pub block_hash: BlockHash,
    /// Position within the block's content.
    pub position: usize,
    pub record: ContentRecord,
}

/// Result of looking up a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContentStatus {
    /// Sealed into a stored block.
    Chained(ContentLocation),
    /// Submitted but not yet sealed.
    Pending { position: usize, record: ContentRecord },
    /// Never submitted to this ledger.
    Unknown,
}

/// Chain statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSummary {
    /// Index of the tail block; `None` before genesis.
    pub height: Option<u64>,
    pub total_blocks: u64,
    /// Records across all stored blocks.
    pub total_records: u64,
    /// Records waiting in the buffer.
    pub pending: usize,
    pub tail_hash: Option<BlockHash>,
}

/// The main Ledger struct.
///
/// Provides a unified API for:
/// - Creating the genesis block
/// - Submitting content records
/// - Sealing pending records into blocks
/// - Listing and validating the chain
/// - Looking up content by fingerprint
pub struct Ledger<S: BlockStore> {
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: LedgerConfig,
    /// Records since the last seal. The lock is the writer domain.
    pending: Arc<Mutex<PendingBuffer>>,
    /// Stops the nonce search in progress.
    cancel: Arc<AtomicBool>,
}

impl<S: BlockStore + 'static> Ledger<S> {
    /// Create a new ledger over `store`.
    ///
    /// Does not touch the store; call [`initialize`](Self::initialize) before
    /// submitting.
    pub fn new(store: S, config: LedgerConfig) -> Result<Self> {
        config.check()?;
        Ok(Self {
            store: Arc::new(store),
            config,
            pending: Arc::new(Mutex::new(PendingBuffer::new())),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Create a ledger and make sure its genesis block exists.
    pub async fn open(store: S, config: LedgerConfig) -> Result<Self> {
        let ledger = Self::new(store, config)?;
        ledger.initialize().await?;
        Ok(ledger)
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create the genesis block if the store is empty.
    ///
    /// Returns `true` if genesis was created, `false` if the chain already
    /// had one.
    pub async fn initialize(&self) -> Result<bool> {
        let writer = self.lock_writer().await;
        let sealer = self.sealer();

        tokio::spawn(async move {
            let _writer = writer;
            sealer.genesis().await
        })
        .await
        .map_err(task_failed)?
    }

    /// Submit a content record.
    ///
    /// The record is buffered; once the buffer reaches the seal threshold,
    /// one block holding every pending record is sealed before returning.
    /// A failed seal does not fail the submit.
    pub async fn submit(&self, record: ContentRecord) -> Result<SubmitOutcome> {
        let mut pending = self.lock_writer().await;

        if self.store.is_empty().await? {
            return Err(LedgerError::NotInitialized);
        }

        if self.config.reject_duplicates {
            let fingerprint = record.fingerprint;
            if pending.position_of(&fingerprint).is_some()
                || self.store.locate_fingerprint(&fingerprint).await?.is_some()
            {
                return Err(LedgerError::DuplicateContent(fingerprint));
            }
        }

        tracing::debug!(
            content_id = %record.content_id,
            fingerprint = %record.fingerprint,
            "buffered content record"
        );
        pending.push(record);

        if !pending.is_full(self.config.seal_threshold) {
            return Ok(SubmitOutcome::Buffered {
                pending: pending.len(),
            });
        }

        let (sealed, pending) = self.sealer().seal_detached(pending).await?;
        match sealed {
            Ok(Some(block)) => Ok(SubmitOutcome::Sealed(block)),
            Ok(None) => Ok(SubmitOutcome::Buffered { pending }),
            Err(error) => {
                tracing::warn!(pending, "seal deferred: {}", error);
                Ok(SubmitOutcome::SealDeferred { pending, error })
            }
        }
    }

    /// Seal every pending record into a new block.
    ///
    /// Returns `None` when nothing is pending. On failure the records stay
    /// pending in their original order.
    pub async fn seal_block(&self) -> Result<Option<Block>> {
        let pending = self.lock_writer().await;

        if self.store.is_empty().await? {
            return Err(LedgerError::NotInitialized);
        }

        let (sealed, _) = self.sealer().seal_detached(pending).await?;
        sealed
    }

    /// Stop the nonce search in progress.
    ///
    /// If no search is running, the next one stops at its first poll.
    pub fn cancel_sealing(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    async fn lock_writer(&self) -> OwnedMutexGuard<PendingBuffer> {
        Arc::clone(&self.pending).lock_owned().await
    }

    fn sealer(&self) -> Sealer<S> {
        Sealer {
            store: Arc::clone(&self.store),
            difficulty: self.config.difficulty,
            limits: self.config.limits,
            cancel: Arc::clone(&self.cancel),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All blocks, ascending by index.
    pub async fn list_blocks(&self) -> Result<Vec<Block>> {
        Ok(self.store.iterate_ascending().await?)
    }

    /// Get a block by index.
    pub async fn get_block(&self, index: u64) -> Result<Option<Block>> {
        Ok(self.store.find_by_index(index).await?)
    }

    /// Get a block by hash.
    pub async fn get_block_by_hash(&self, hash: &BlockHash) -> Result<Option<Block>> {
        Ok(self.store.find_by_hash(hash).await?)
    }

    /// Number of records waiting for the next block.
    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Snapshot of the records waiting for the next block.
    pub async fn pending_records(&self) -> Vec<ContentRecord> {
        self.pending.lock().await.iter().cloned().collect()
    }

    /// Find where a content fingerprint landed.
    ///
    /// Waits for an in-flight seal, so a record is always either chained or
    /// pending.
    pub async fn locate(&self, fingerprint: &Fingerprint) -> Result<ContentStatus> {
        let pending = self.pending.lock().await;

        if let Some(pos) = self.store.locate_fingerprint(fingerprint).await? {
            let block = self
                .store
                .find_by_index(pos.block_index)
                .await?
                .ok_or_else(|| {
                    LedgerError::Store(StoreError::InvalidData(format!(
                        "fingerprint indexed at missing block {}",
                        pos.block_index
                    )))
                })?;
            let record = block.content.get(pos.position).cloned().ok_or_else(|| {
                LedgerError::Store(StoreError::InvalidData(format!(
                    "fingerprint indexed at block {} position {} out of range",
                    pos.block_index, pos.position
                )))
            })?;
            return Ok(ContentStatus::Chained(ContentLocation {
                block_index: block.index,
                block_hash: block.hash,
                position: pos.position,
                record,
            }));
        }

        if let Some(position) = pending.position_of(fingerprint) {
            let record = pending.iter().nth(position).cloned();
            if let Some(record) = record {
                return Ok(ContentStatus::Pending { position, record });
            }
        }

        Ok(ContentStatus::Unknown)
    }

    /// Chain statistics.
    ///
    /// Holds the writer lock across the store reads, so no record is counted
    /// both as pending and as stored.
    pub async fn summary(&self) -> Result<ChainSummary> {
        let pending = self.pending.lock().await;
        let tail = self.store.tail().await?;

        Ok(ChainSummary {
            height: tail.as_ref().map(|b| b.index),
            total_blocks: self.store.count().await?,
            total_records: self.store.record_count().await?,
            pending: pending.len(),
            tail_hash: tail.map(|b| b.hash),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Walk the stored chain and report the first integrity violation.
    pub async fn verify(&self) -> Result<()> {
        let blocks = self.store.iterate_ascending().await?;

        if let Err(e) = validate_chain(&blocks, &self.config.validation) {
            tracing::warn!(index = e.block_index(), "chain validation failed: {}", e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Whether the stored chain passes validation.
    ///
    /// Storage failures are errors, not an invalid chain.
    pub async fn is_valid(&self) -> Result<bool> {
        match self.verify().await {
            Ok(()) => Ok(true),
            Err(LedgerError::Validation(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sealing
// ─────────────────────────────────────────────────────────────────────────────

/// What a seal task hands back: its result and the pending count after it.
type SealRun = (Result<Option<Block>>, usize);

/// Owned handles for one seal, so it can outlive the caller's future.
struct Sealer<S> {
    store: Arc<S>,
    difficulty: u32,
    limits: SealLimits,
    cancel: Arc<AtomicBool>,
}

impl<S: BlockStore + 'static> Sealer<S> {
    /// Seal on a spawned task that owns the writer lock.
    ///
    /// Dropping the returned future leaves the task running; the lock is
    /// released only once the records are stored or restored.
    async fn seal_detached(self, mut pending: OwnedMutexGuard<PendingBuffer>) -> Result<SealRun> {
        tokio::spawn(async move {
            let sealed = self.seal_pending(&mut pending).await;
            (sealed, pending.len())
        })
        .await
        .map_err(task_failed)
    }

    async fn genesis(&self) -> Result<bool> {
        if !self.store.is_empty().await? {
            return Ok(false);
        }

        let (genesis, attempts) = self.mine(BlockSkeleton::genesis()).await?;
        self.store.append(&genesis).await?;

        tracing::info!(
            hash = %genesis.hash,
            nonce = genesis.nonce,
            attempts,
            "created genesis block"
        );
        Ok(true)
    }

    async fn seal_pending(&self, pending: &mut PendingBuffer) -> Result<Option<Block>> {
        if pending.is_empty() {
            return Ok(None);
        }

        let tail = self.store.tail().await?.ok_or(LedgerError::NotInitialized)?;
        let records = pending.drain();
        let skeleton = BlockSkeleton::next(&tail, records.clone());

        let (block, attempts) = match self.mine(skeleton).await {
            Ok(mined) => mined,
            Err(e) => {
                pending.restore(records);
                return Err(e);
            }
        };

        if let Err(e) = self.store.append(&block).await {
            pending.restore(records);
            return Err(e.into());
        }

        tracing::info!(
            index = block.index,
            nonce = block.nonce,
            attempts,
            records = block.content.len(),
            hash = %block.hash,
            "sealed block"
        );
        Ok(Some(block))
    }

    /// Run the nonce search on the blocking pool.
    ///
    /// The cancel flag is disarmed as soon as the search returns.
    async fn mine(&self, skeleton: BlockSkeleton) -> Result<(Block, u64)> {
        let difficulty = self.difficulty;
        let limits = self.limits;
        let cancel = Arc::clone(&self.cancel);

        let mined = tokio::task::spawn_blocking(move || {
            let searched = seal_with_cancel(&skeleton, difficulty, &limits, &cancel);
            cancel.store(false, Ordering::Relaxed);
            let seal = searched?;
            Ok::<_, PowError>((skeleton.into_block(seal), seal.attempts))
        })
        .await
        .map_err(task_failed)?;
        Ok(mined?)
    }
}

fn task_failed(e: JoinError) -> LedgerError {
    LedgerError::Task(format!("ledger task failed: {}", e))
}
