//! Chain validation: digest recomputation and link checks.
//!
//! By default the walk checks genesis shape, index contiguity, that every
//! stored hash equals its recomputed digest, and that every block links to
//! its predecessor's hash. It does not re-check the difficulty predicate on
//! historical blocks unless [`ValidationOptions::strict`] asks for it.

use serde::{Deserialize, Serialize};

use crate::block::{Block, GENESIS_INDEX};
use crate::error::ValidationError;
use crate::pow::meets_difficulty;

/// Which optional checks the walk performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Also require every block's hash to meet this difficulty.
    pub difficulty: Option<u32>,
}

impl ValidationOptions {
    /// Hash and link checks only.
    pub const fn narrow() -> Self {
        Self { difficulty: None }
    }

    /// Hash and link checks plus the difficulty predicate.
    pub const fn strict(difficulty: u32) -> Self {
        Self {
            difficulty: Some(difficulty),
        }
    }
}

/// Validate a whole chain given in ascending index order.
///
/// Returns the first violation found. An empty chain and a genesis-only chain
/// are both valid.
pub fn validate_chain(
    blocks: &[Block],
    options: &ValidationOptions,
) -> Result<(), ValidationError> {
    let Some(genesis) = blocks.first() else {
        return Ok(());
    };
    validate_genesis(genesis, options)?;

    for pair in blocks.windows(2) {
        validate_successor(&pair[0], &pair[1], options)?;
    }

    Ok(())
}

/// Validate the genesis block on its own.
pub fn validate_genesis(
    block: &Block,
    options: &ValidationOptions,
) -> Result<(), ValidationError> {
    if block.index != GENESIS_INDEX {
        return Err(ValidationError::GenesisIndex(block.index));
    }
    if !block.previous_hash.is_zero() {
        return Err(ValidationError::GenesisLink(block.previous_hash));
    }
    validate_block(block, options)
}

/// Validate `block` as the direct successor of `prev`.
pub fn validate_successor(
    prev: &Block,
    block: &Block,
    options: &ValidationOptions,
) -> Result<(), ValidationError> {
    let expected = prev.index + 1;
    if block.index != expected {
        return Err(ValidationError::IndexGap {
            expected,
            got: block.index,
        });
    }

    validate_block(block, options)?;

    if block.previous_hash != prev.hash {
        return Err(ValidationError::BrokenLink {
            index: block.index,
            expected: prev.hash,
            got: block.previous_hash,
        });
    }

    Ok(())
}

/// Check a block's stored hash against its own fields.
pub fn validate_block(block: &Block, options: &ValidationOptions) -> Result<(), ValidationError> {
    let computed = block
        .compute_hash()
        .map_err(|e| ValidationError::Unencodable {
            index: block.index,
            reason: e.to_string(),
        })?;

    if computed != block.hash {
        return Err(ValidationError::HashMismatch {
            index: block.index,
            stored: block.hash,
            computed,
        });
    }

    if let Some(difficulty) = options.difficulty {
        if !meets_difficulty(&block.hash, difficulty) {
            return Err(ValidationError::InsufficientWork {
                index: block.index,
                hash: block.hash,
                difficulty,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockSkeleton;
    use crate::content::ContentRecord;
    use crate::pow::{seal, SealLimits};
    use crate::types::{BlockHash, Fingerprint};

    fn record(n: u8) -> ContentRecord {
        ContentRecord::from_parts(
            format!("c-{}", n),
            Fingerprint::from_bytes([n; 32]),
            1_700_000_000_000 + n as i64,
            format!("title {}", n),
            "author",
        )
    }

    fn build_chain(len: usize) -> Vec<Block> {
        let limits = SealLimits::default();
        let genesis_skeleton = BlockSkeleton::genesis();
        let genesis_seal = seal(&genesis_skeleton, 2, &limits).unwrap();
        let mut chain = vec![genesis_skeleton.into_block(genesis_seal)];

        for i in 1..len {
            let content = (0..3).map(|k| record((i * 3 + k) as u8)).collect();
            let skeleton = BlockSkeleton::next(chain.last().unwrap(), content);
            let sealed = seal(&skeleton, 2, &limits).unwrap();
            chain.push(skeleton.into_block(sealed));
        }
        chain
    }

    /// Re-seal a block in place after tampering, so only the link is wrong.
    fn reseal(block: &mut Block) {
        let skeleton = BlockSkeleton {
            index: block.index,
            timestamp: block.timestamp,
            previous_hash: block.previous_hash,
            content: block.content.clone(),
        };
        let sealed = seal(&skeleton, 2, &SealLimits::default()).unwrap();
        block.nonce = sealed.nonce;
        block.hash = sealed.hash;
    }

    #[test]
    fn test_valid_chain() {
        let chain = build_chain(4);
        assert!(validate_chain(&chain, &ValidationOptions::narrow()).is_ok());
        assert!(validate_chain(&chain, &ValidationOptions::strict(2)).is_ok());
    }

    #[test]
    fn test_empty_and_genesis_only_are_valid() {
        assert!(validate_chain(&[], &ValidationOptions::narrow()).is_ok());
        let chain = build_chain(1);
        assert!(validate_chain(&chain, &ValidationOptions::narrow()).is_ok());
    }

    #[test]
    fn test_tampered_content_timestamp() {
        let mut chain = build_chain(3);
        chain[2].content[0].timestamp += 1;

        let err = validate_chain(&chain, &ValidationOptions::narrow()).unwrap_err();
        assert!(matches!(err, ValidationError::HashMismatch { index: 2, .. }));
    }

    #[test]
    fn test_tampered_nonce() {
        let mut chain = build_chain(2);
        chain[1].nonce += 1;

        let err = validate_chain(&chain, &ValidationOptions::narrow()).unwrap_err();
        assert_eq!(err.block_index(), 1);
    }

    #[test]
    fn test_tampered_previous_hash_detected() {
        let mut chain = build_chain(3);
        chain[1].previous_hash = BlockHash::from_bytes([0xee; 32]);

        assert!(validate_chain(&chain, &ValidationOptions::narrow()).is_err());
    }

    #[test]
    fn test_broken_link_detected_independently_of_digest() {
        let mut chain = build_chain(3);
        chain[1].previous_hash = BlockHash::from_bytes([0xee; 32]);
        reseal(&mut chain[1]);

        // The digest of block 1 is consistent with its (tampered) fields...
        assert_eq!(chain[1].compute_hash().unwrap(), chain[1].hash);

        // ...so only the link check can catch it. Block 2 now points at the
        // old hash as well, but block 1 fails first.
        let err = validate_chain(&chain, &ValidationOptions::narrow()).unwrap_err();
        assert!(matches!(err, ValidationError::BrokenLink { index: 1, .. }));
    }

    #[test]
    fn test_index_gap() {
        let mut chain = build_chain(4);
        chain.remove(2);

        let err = validate_chain(&chain, &ValidationOptions::narrow()).unwrap_err();
        assert_eq!(err, ValidationError::IndexGap { expected: 2, got: 3 });
    }

    #[test]
    fn test_genesis_shape() {
        let mut chain = build_chain(1);
        chain[0].previous_hash = BlockHash::from_bytes([1; 32]);
        let err = validate_chain(&chain, &ValidationOptions::narrow()).unwrap_err();
        assert!(matches!(err, ValidationError::GenesisLink(_)));
    }

    #[test]
    fn test_strict_mode_checks_difficulty() {
        // Seal at difficulty 0: digest is consistent but has no work behind it.
        let skeleton = BlockSkeleton::genesis();
        let sealed = seal(&skeleton, 0, &SealLimits::default()).unwrap();
        let chain = vec![skeleton.into_block(sealed)];

        assert!(validate_chain(&chain, &ValidationOptions::narrow()).is_ok());
        let err = validate_chain(&chain, &ValidationOptions::strict(2)).unwrap_err();
        assert!(matches!(err, ValidationError::InsufficientWork { index: 0, .. }));
    }
}
