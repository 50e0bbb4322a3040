//! # Proofchain Core
//!
//! Pure primitives for the Proofchain content ledger: blocks, canonical
//! hashing, proof-of-work, the pending buffer and chain validation.
//!
//! This crate contains no I/O, no storage, no async. It is pure computation
//! over hash-linked data structures.
//!
//! ## Key Types
//!
//! - [`Block`] - A sealed, immutable batch of content records
//! - [`BlockSkeleton`] - A block awaiting its proof-of-work seal
//! - [`ContentRecord`] - The fingerprint of one submitted piece of content
//! - [`BlockHash`] / [`Fingerprint`] - SHA-256 digests rendered as hex
//! - [`PendingBuffer`] - Records waiting for the next block
//!
//! ## Hashing
//!
//! Block digests are SHA-256 over a frozen canonical encoding. See
//! [`canonical`].

pub mod block;
pub mod canonical;
pub mod content;
pub mod crypto;
pub mod error;
pub mod pending;
pub mod pow;
pub mod types;
pub mod validation;

pub use block::{iso8601, Block, BlockSkeleton, BlockView, RecordView, GENESIS_INDEX};
pub use canonical::{block_digest, canonical_content, BlockPreimage};
pub use content::{now_millis, ContentRecord};
pub use error::{CoreError, PowError, ValidationError};
pub use pending::{PendingBuffer, DEFAULT_SEAL_THRESHOLD};
pub use pow::{meets_difficulty, seal, seal_with_cancel, Seal, SealLimits, DEFAULT_DIFFICULTY};
pub use types::{BlockHash, ContentId, Fingerprint};
pub use validation::{
    validate_block, validate_chain, validate_genesis, validate_successor, ValidationOptions,
};
