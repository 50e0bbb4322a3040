//! # Proofchain
//!
//! A content-integrity ledger: content fingerprints are batched into blocks,
//! each block is sealed by proof-of-work and hash-linked to its predecessor,
//! and the whole chain can be re-verified at any time.
//!
//! ## Overview
//!
//! - **Records**: Each submission is a [`ContentRecord`] carrying the SHA-256
//!   fingerprint of a content body, never the body itself
//! - **Blocks**: Immutable batches of records, linked by `previous_hash`
//! - **Sealing**: Once enough records are pending, one block is mined and appended
//! - **Validation**: Recompute every digest and check every link
//!
//! ## Usage
//!
//! ```rust,no_run
//! use proofchain::{ContentRecord, Ledger, LedgerConfig};
//! use proofchain::store::SqliteStore;
//!
//! async fn example() {
//!     // Open storage
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!
//!     // Create the ledger; this seals genesis on an empty store
//!     let ledger = Ledger::open(store, LedgerConfig::default()).await.unwrap();
//!
//!     // Submit content
//!     let record = ContentRecord::new("post-1", "Hello", "alice", b"hello world");
//!     let outcome = ledger.submit(record).await.unwrap();
//!
//!     // Check the chain
//!     assert!(ledger.is_valid().await.unwrap());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `proofchain::core` - Core primitives (Block, ContentRecord, hashing, PoW)
//! - `proofchain::store` - Storage abstraction and SQLite

pub mod config;
pub mod error;
pub mod ledger;

// Re-export component crates
pub use proofchain_core as core;
pub use proofchain_store as store;

// Re-export main types for convenience
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::{ChainSummary, ContentLocation, ContentStatus, Ledger, SubmitOutcome};

// Re-export commonly used core types
pub use proofchain_core::{
    Block, BlockHash, BlockView, ContentId, ContentRecord, Fingerprint, RecordView, SealLimits,
    ValidationError, ValidationOptions,
};
