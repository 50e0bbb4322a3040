//! Error types for the store module.

use proofchain_core::BlockHash;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Block content serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Append did not extend the current tail.
    #[error("append conflict: store expects block {expected}, got block {got}")]
    Conflict { expected: u64, got: u64 },

    /// A block with this hash is already stored.
    #[error("block hash {0:?} already stored")]
    DuplicateHash(BlockHash),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    /// A blocking task failed to complete.
    #[error("blocking task failed: {0}")]
    Task(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
