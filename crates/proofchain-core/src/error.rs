//! Error types for Proofchain Core.

use thiserror::Error;

use crate::types::BlockHash;

/// Core errors that can occur while encoding blocks.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Proof-of-work search failures.
///
/// None of these mean the chain is damaged; the skeleton was simply not
/// sealed.
#[derive(Debug, Error)]
pub enum PowError {
    #[error("difficulty {0} exceeds the 64 hex digits of a digest")]
    DifficultyOutOfRange(u32),

    #[error("no satisfying nonce within {attempts} attempts")]
    Exhausted { attempts: u64 },

    #[error("nonce search timed out after {elapsed_ms} ms ({attempts} attempts)")]
    TimedOut { attempts: u64, elapsed_ms: u64 },

    #[error("nonce search cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Integrity violations found while walking a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("genesis block has index {0}, expected 0")]
    GenesisIndex(u64),

    #[error("genesis block links to {0:?}, expected the zero sentinel")]
    GenesisLink(BlockHash),

    #[error("index gap: expected block {expected}, got {got}")]
    IndexGap { expected: u64, got: u64 },

    #[error("block {index}: stored hash {stored:?} does not match recomputed {computed:?}")]
    HashMismatch {
        index: u64,
        stored: BlockHash,
        computed: BlockHash,
    },

    #[error("block {index}: previous_hash {got:?} does not match the previous block's hash {expected:?}")]
    BrokenLink {
        index: u64,
        expected: BlockHash,
        got: BlockHash,
    },

    #[error("block {index}: hash {hash:?} does not meet difficulty {difficulty}")]
    InsufficientWork {
        index: u64,
        hash: BlockHash,
        difficulty: u32,
    },

    #[error("block {index}: {reason}")]
    Unencodable { index: u64, reason: String },
}

impl ValidationError {
    /// Index of the offending block.
    pub fn block_index(&self) -> u64 {
        match self {
            ValidationError::GenesisIndex(_) | ValidationError::GenesisLink(_) => 0,
            ValidationError::IndexGap { got, .. } => *got,
            ValidationError::HashMismatch { index, .. }
            | ValidationError::BrokenLink { index, .. }
            | ValidationError::InsufficientWork { index, .. }
            | ValidationError::Unencodable { index, .. } => *index,
        }
    }
}
