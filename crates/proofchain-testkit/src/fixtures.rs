//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use rand::Rng;

use proofchain::{Ledger, LedgerConfig};
use proofchain_core::{seal, Block, BlockSkeleton, ContentRecord, Fingerprint, SealLimits};
use proofchain_store::MemoryStore;

/// Fixed timestamp used by deterministic fixtures (2023-11-14T22:13:20Z).
pub const FIXED_TIMESTAMP: i64 = 1_700_000_000_000;

/// Configuration that seals quickly: difficulty 1, threshold as given.
pub fn fast_config(seal_threshold: usize) -> LedgerConfig {
    LedgerConfig::default()
        .with_difficulty(1)
        .with_seal_threshold(seal_threshold)
}

/// A test fixture with a ledger over a memory store.
pub struct LedgerFixture {
    pub ledger: Ledger<MemoryStore>,
}

impl LedgerFixture {
    /// Create an initialized ledger with the given configuration.
    pub async fn new(config: LedgerConfig) -> Self {
        let ledger = Ledger::open(MemoryStore::new(), config)
            .await
            .expect("ledger fixture");
        Self { ledger }
    }

    /// Create an initialized ledger at difficulty 1 and the default threshold.
    pub async fn fast() -> Self {
        Self::new(fast_config(proofchain_core::DEFAULT_SEAL_THRESHOLD)).await
    }

    /// The underlying store.
    pub fn store(&self) -> &MemoryStore {
        self.ledger.store()
    }

    /// Submit `count` numbered records, starting at `first`.
    pub async fn submit_numbered(&self, first: u32, count: u32) {
        for n in first..first + count {
            self.ledger
                .submit(numbered_record(n))
                .await
                .expect("submit fixture record");
        }
    }
}

/// Body text of the `n`th numbered record.
pub fn body(n: u32) -> String {
    format!("body-{}", n)
}

/// A deterministic record: `content-n`, fingerprint of `body-n`, fixed
/// timestamp plus `n`.
pub fn numbered_record(n: u32) -> ContentRecord {
    ContentRecord::from_parts(
        format!("content-{}", n),
        Fingerprint::of(body(n).as_bytes()),
        FIXED_TIMESTAMP + n as i64,
        format!("Title {}", n),
        "alice",
    )
}

/// A record with a random body and identifier, stamped now.
pub fn random_record() -> ContentRecord {
    let mut rng = rand::thread_rng();
    let body: [u8; 32] = rng.gen();
    let id: u64 = rng.gen();
    ContentRecord::new(format!("content-{:016x}", id), "Random", "fixture", &body)
}

/// Build a valid chain without a ledger: genesis plus `blocks` blocks of
/// `per_block` numbered records each, sealed at `difficulty`.
pub fn sealed_chain(blocks: u32, per_block: u32, difficulty: u32) -> Vec<Block> {
    let limits = SealLimits::UNBOUNDED;

    let skeleton = BlockSkeleton::genesis().with_timestamp(FIXED_TIMESTAMP);
    let sealed = seal(&skeleton, difficulty, &limits).expect("seal genesis");
    let mut chain = vec![skeleton.into_block(sealed)];

    for b in 0..blocks {
        let content = (0..per_block)
            .map(|r| numbered_record(b * per_block + r + 1))
            .collect();
        let tail = &chain[chain.len() - 1];
        let skeleton = BlockSkeleton::next(tail, content).with_timestamp(FIXED_TIMESTAMP);
        let sealed = seal(&skeleton, difficulty, &limits).expect("seal block");
        chain.push(skeleton.into_block(sealed));
    }

    chain
}
