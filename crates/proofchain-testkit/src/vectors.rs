//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the block digest encoding and the proof-of-work search.
//! Any change to field order, JSON formatting, or the nonce loop breaks them.

use proofchain_core::{
    block_digest, seal, BlockHash, BlockSkeleton, ContentRecord, Fingerprint, SealLimits,
};

/// Hash of the genesis vector, used as the link of the following vectors.
pub const GENESIS_HASH: &str = "00aa84af2bed46767b746f907fb702e1848f844c0b7e4b92c4e48d589fbf0e41";

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Block index.
    pub index: u64,
    /// Previous hash (hex).
    pub previous_hash: &'static str,
    /// Block content.
    pub content: Vec<ContentRecord>,
    /// Difficulty the vector is sealed at.
    pub difficulty: u32,
    /// Expected digest at nonce 0 (hex).
    pub digest_at_zero: &'static str,
    /// Expected smallest satisfying nonce.
    pub nonce: u64,
    /// Expected sealed hash (hex).
    pub hash: &'static str,
}

fn hello_record() -> ContentRecord {
    ContentRecord::from_parts(
        "content-1",
        Fingerprint::of(b"hello world"),
        1_700_000_000_000,
        "Hello",
        "alice",
    )
}

fn five_records() -> Vec<ContentRecord> {
    (1..=5)
        .map(|k: i64| {
            ContentRecord::from_parts(
                format!("content-{}", k),
                Fingerprint::of(format!("body-{}", k).as_bytes()),
                1_700_000_000_000 + k,
                format!("Title {}", k),
                "alice",
            )
        })
        .collect()
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    let zero = "0000000000000000000000000000000000000000000000000000000000000000";
    vec![
        GoldenVector {
            name: "genesis at difficulty 2",
            index: 0,
            previous_hash: zero,
            content: vec![],
            difficulty: 2,
            digest_at_zero: "f2657839be2e952c34fcf9f0dda4de78c02cd9c3f97327f99b9a24ce39590f28",
            nonce: 14,
            hash: GENESIS_HASH,
        },
        GoldenVector {
            name: "one record after genesis",
            index: 1,
            previous_hash: GENESIS_HASH,
            content: vec![hello_record()],
            difficulty: 2,
            digest_at_zero: "5871804b5597596df67e9b3cc33d5315144f41ccf35aba0a91a90724425eeaa7",
            nonce: 20,
            hash: "00c1ea6012a2f7b47f9c478498669979f126f8c4dbba0717619ea632ce78a00b",
        },
        GoldenVector {
            name: "five records after genesis",
            index: 1,
            previous_hash: GENESIS_HASH,
            content: five_records(),
            difficulty: 2,
            digest_at_zero: "904b8f8338787d2b07da00a01e455799ba8efb946141f74b8cf1abb691141b40",
            nonce: 21,
            hash: "005978128ef27a169caadf30c1f370d874b49a4ef16a6d9da9884df3eec623ff",
        },
        GoldenVector {
            name: "genesis at difficulty 3",
            index: 0,
            previous_hash: zero,
            content: vec![],
            difficulty: 3,
            digest_at_zero: "f2657839be2e952c34fcf9f0dda4de78c02cd9c3f97327f99b9a24ce39590f28",
            nonce: 11723,
            hash: "000531a083db22c1d0521a640b00529894dbae2a6683a9c470cee0343bffd57b",
        },
    ]
}

/// Build the unsealed block a vector describes.
pub fn skeleton_from_vector(vector: &GoldenVector) -> BlockSkeleton {
    BlockSkeleton {
        index: vector.index,
        timestamp: 0,
        previous_hash: BlockHash::from_hex(vector.previous_hash).unwrap_or(BlockHash::ZERO),
        content: vector.content.clone(),
    }
}

/// Verify every golden vector against this build.
///
/// Returns `(name, matches, sealed hash hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let skeleton = skeleton_from_vector(v);

            let zero_ok = block_digest(v.index, &skeleton.previous_hash, &v.content, 0)
                .map(|h| h.to_hex() == v.digest_at_zero)
                .unwrap_or(false);

            match seal(&skeleton, v.difficulty, &SealLimits::UNBOUNDED) {
                Ok(sealed) => {
                    let hex = sealed.hash.to_hex();
                    let matches = zero_ok && sealed.nonce == v.nonce && hex == v.hash;
                    (v.name.to_string(), matches, hex)
                }
                Err(e) => (v.name.to_string(), false, e.to_string()),
            }
        })
        .collect()
}
