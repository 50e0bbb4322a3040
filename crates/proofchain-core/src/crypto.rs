//! Hashing primitives.
//!
//! Everything in the ledger is SHA-256: block hashes and content
//! fingerprints alike.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the SHA-256 digest of several parts, as if concatenated.
pub fn sha256_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
