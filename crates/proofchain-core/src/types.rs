//! Strong type definitions for Proofchain.
//!
//! All identifiers are newtypes to prevent misuse at compile time. Digests
//! serialize as lowercase hex strings so the canonical block encoding and the
//! explorer output read the same way.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::crypto::sha256;

/// Length of a hex-rendered SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

fn decode_digest(s: &str) -> Result<[u8; 32], hex::FromHexError> {
    let bytes = hex::decode(s)?;
    if bytes.len() != 32 {
        return Err(hex::FromHexError::InvalidStringLength);
    }
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// A 32-byte block hash: SHA-256 over the canonical block input.
///
/// The genesis block links to [`BlockHash::ZERO`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHash(pub [u8; 32]);

impl BlockHash {
    /// The all-zero hash (genesis `previous_hash` sentinel).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a new BlockHash from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        decode_digest(s).map(Self)
    }

    /// Whether this is the genesis sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Number of leading `'0'` characters in the hex rendering.
    pub fn leading_zero_nibbles(&self) -> u32 {
        let mut count = 0;
        for byte in self.0 {
            if byte == 0 {
                count += 2;
                continue;
            }
            if byte >> 4 == 0 {
                count += 1;
            }
            break;
        }
        count
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for BlockHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for BlockHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for BlockHash {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// SHA-256 fingerprint of a piece of submitted content.
///
/// Only the fingerprint is chained, never the content body.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Fingerprint a content body.
    pub fn of(body: &[u8]) -> Self {
        Self(sha256(body))
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        decode_digest(s).map(Self)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Opaque identifier assigned to a content record by the submitting system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_hash_hex_roundtrip() {
        let hash = BlockHash::from_bytes([0x42; 32]);
        let hex = hash.to_hex();
        assert_eq!(hex.len(), DIGEST_HEX_LEN);
        assert_eq!(BlockHash::from_hex(&hex).unwrap(), hash);
    }

    #[test]
    fn test_block_hash_rejects_short_hex() {
        assert!(BlockHash::from_hex("00ff").is_err());
        assert!(BlockHash::from_hex("zz").is_err());
    }

    #[test]
    fn test_zero_sentinel_renders_as_zeros() {
        assert!(BlockHash::ZERO.is_zero());
        assert_eq!(BlockHash::ZERO.to_hex(), "0".repeat(DIGEST_HEX_LEN));
        assert_eq!(BlockHash::ZERO.leading_zero_nibbles(), 64);
    }

    #[test]
    fn test_leading_zero_nibbles() {
        let mut bytes = [0xffu8; 32];
        assert_eq!(BlockHash(bytes).leading_zero_nibbles(), 0);

        bytes[0] = 0x0f;
        assert_eq!(BlockHash(bytes).leading_zero_nibbles(), 1);

        bytes[0] = 0x00;
        assert_eq!(BlockHash(bytes).leading_zero_nibbles(), 2);

        bytes[1] = 0x01;
        assert_eq!(BlockHash(bytes).leading_zero_nibbles(), 3);
    }

    #[test]
    fn test_fingerprint_of_known_body() {
        let fp = Fingerprint::of(b"hello world");
        assert_eq!(
            fp.to_hex(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_digest_serializes_as_hex_string() {
        let fp = Fingerprint::from_bytes([0xab; 32]);
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));

        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
    }

    #[test]
    fn test_block_hash_display() {
        let hash = BlockHash::from_bytes([0xcd; 32]);
        assert_eq!(format!("{}", hash), "cd".repeat(32));
        assert!(format!("{:?}", hash).starts_with("BlockHash("));
    }

    proptest::proptest! {
        #[test]
        fn test_leading_zero_nibbles_matches_hex(bytes in proptest::prelude::any::<[u8; 32]>()) {
            let hash = BlockHash::from_bytes(bytes);
            let expected = hash.to_hex().chars().take_while(|&c| c == '0').count() as u32;
            proptest::prop_assert_eq!(hash.leading_zero_nibbles(), expected);
        }
    }
}
