//! Canonical block encoding and the block digest.
//!
//! The digest input is the byte string
//!
//! ```text
//! decimal(index) || hex(previous_hash) || json(content) || decimal(nonce)
//! ```
//!
//! where `json(content)` is compact JSON of the record array with the field
//! order fixed by [`ContentRecord`], fingerprints as lowercase hex and
//! timestamps as integer milliseconds. No whitespace, no trailing newline.
//!
//! **This encoding is FROZEN.** Changing it invalidates every stored hash.

use crate::content::ContentRecord;
use crate::crypto::sha256_parts;
use crate::error::CoreError;
use crate::types::BlockHash;

/// Encode a content list to its canonical JSON bytes.
pub fn canonical_content(content: &[ContentRecord]) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec(content).map_err(|e| CoreError::EncodingError(e.to_string()))
}

/// The nonce-independent part of a block's digest input.
///
/// Proof-of-work hashes the same prefix millions of times with different
/// nonces, so the content is encoded once up front.
#[derive(Debug, Clone)]
pub struct BlockPreimage {
    prefix: Vec<u8>,
}

impl BlockPreimage {
    /// Build the preimage for a block's index, link and content.
    pub fn new(
        index: u64,
        previous_hash: &BlockHash,
        content: &[ContentRecord],
    ) -> Result<Self, CoreError> {
        let content_json = canonical_content(content)?;
        let previous_hex = previous_hash.to_hex();
        let index_str = index.to_string();

        let mut prefix =
            Vec::with_capacity(index_str.len() + previous_hex.len() + content_json.len());
        prefix.extend_from_slice(index_str.as_bytes());
        prefix.extend_from_slice(previous_hex.as_bytes());
        prefix.extend_from_slice(&content_json);

        Ok(Self { prefix })
    }

    /// Digest of the preimage completed with `nonce`.
    pub fn digest(&self, nonce: u64) -> BlockHash {
        let nonce_str = nonce.to_string();
        BlockHash(sha256_parts(&[&self.prefix, nonce_str.as_bytes()]))
    }

    /// Full digest input for `nonce` (for debugging and golden vectors).
    pub fn bytes_with_nonce(&self, nonce: u64) -> Vec<u8> {
        let mut buf = self.prefix.clone();
        buf.extend_from_slice(nonce.to_string().as_bytes());
        buf
    }
}

/// Compute a block's digest from its fields.
pub fn block_digest(
    index: u64,
    previous_hash: &BlockHash,
    content: &[ContentRecord],
    nonce: u64,
) -> Result<BlockHash, CoreError> {
    Ok(BlockPreimage::new(index, previous_hash, content)?.digest(nonce))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fingerprint;

    fn record() -> ContentRecord {
        ContentRecord::from_parts(
            "content-1",
            Fingerprint::of(b"hello world"),
            1_700_000_000_000,
            "Hello",
            "alice",
        )
    }

    #[test]
    fn test_empty_content_encodes_as_empty_array() {
        assert_eq!(canonical_content(&[]).unwrap(), b"[]");
    }

    #[test]
    fn test_preimage_layout() {
        let preimage = BlockPreimage::new(0, &BlockHash::ZERO, &[]).unwrap();
        let bytes = preimage.bytes_with_nonce(14);
        let expected = format!("0{}[]14", "0".repeat(64));
        assert_eq!(bytes, expected.into_bytes());
    }

    #[test]
    fn test_digest_deterministic() {
        let prev = BlockHash::from_bytes([0x42; 32]);
        let content = vec![record()];
        let h1 = block_digest(1, &prev, &content, 7).unwrap();
        let h2 = block_digest(1, &prev, &content, 7).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_digest_known_value() {
        let hash = block_digest(0, &BlockHash::ZERO, &[], 0).unwrap();
        assert_eq!(
            hash.to_hex(),
            "f2657839be2e952c34fcf9f0dda4de78c02cd9c3f97327f99b9a24ce39590f28"
        );
    }

    #[test]
    fn test_every_field_affects_digest() {
        let prev = BlockHash::from_bytes([0x42; 32]);
        let content = vec![record()];
        let base = block_digest(1, &prev, &content, 0).unwrap();

        assert_ne!(base, block_digest(2, &prev, &content, 0).unwrap());
        assert_ne!(base, block_digest(1, &BlockHash::ZERO, &content, 0).unwrap());
        assert_ne!(base, block_digest(1, &prev, &[], 0).unwrap());
        assert_ne!(base, block_digest(1, &prev, &content, 1).unwrap());

        let mut shifted = record();
        shifted.timestamp += 1;
        assert_ne!(base, block_digest(1, &prev, &[shifted], 0).unwrap());
    }

    #[test]
    fn test_content_order_matters() {
        let prev = BlockHash::ZERO;
        let a = record();
        let mut b = record();
        b.content_id = "content-2".into();

        let ab = block_digest(1, &prev, &[a.clone(), b.clone()], 0).unwrap();
        let ba = block_digest(1, &prev, &[b, a], 0).unwrap();
        assert_ne!(ab, ba);
    }
}
