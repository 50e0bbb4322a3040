//! Error types for the Ledger.

use proofchain_core::{CoreError, Fingerprint, PowError, ValidationError};
use proofchain_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Proof-of-work search did not produce a seal.
    #[error("sealing failed: {0}")]
    Pow(#[from] PowError),

    /// Block encoding error.
    #[error("encoding error: {0}")]
    Core(#[from] CoreError),

    /// The ledger has no genesis block yet.
    #[error("ledger not initialized: no genesis block")]
    NotInitialized,

    /// The fingerprint is already pending or chained.
    #[error("duplicate content: {0:?}")]
    DuplicateContent(Fingerprint),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A blocking task failed to complete.
    #[error("task failed: {0}")]
    Task(String),
}

/// Result type for Ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
