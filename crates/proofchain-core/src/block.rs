//! Block: one sealed, immutable unit of the ledger.
//!
//! A block is built as a [`BlockSkeleton`] (everything except the nonce and
//! hash), sealed by proof-of-work, and then never edited again.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::canonical::{block_digest, BlockPreimage};
use crate::content::{now_millis, ContentRecord};
use crate::error::CoreError;
use crate::pow::Seal;
use crate::types::BlockHash;

/// Index of the genesis block.
pub const GENESIS_INDEX: u64 = 0;

/// An unsealed block: index, link and content, awaiting a nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSkeleton {
    pub index: u64,
    pub timestamp: i64,
    pub previous_hash: BlockHash,
    pub content: Vec<ContentRecord>,
}

impl BlockSkeleton {
    /// Skeleton for the genesis block.
    pub fn genesis() -> Self {
        Self {
            index: GENESIS_INDEX,
            timestamp: now_millis(),
            previous_hash: BlockHash::ZERO,
            content: Vec::new(),
        }
    }

    /// Skeleton for the block following `tail`.
    pub fn next(tail: &Block, content: Vec<ContentRecord>) -> Self {
        Self {
            index: tail.index + 1,
            timestamp: now_millis(),
            previous_hash: tail.hash,
            content,
        }
    }

    /// Override the creation timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The nonce-independent digest input for this skeleton.
    pub fn preimage(&self) -> Result<BlockPreimage, CoreError> {
        BlockPreimage::new(self.index, &self.previous_hash, &self.content)
    }

    /// Finish the block with a proof-of-work seal.
    pub fn into_block(self, seal: Seal) -> Block {
        Block {
            index: self.index,
            timestamp: self.timestamp,
            content: self.content,
            previous_hash: self.previous_hash,
            nonce: seal.nonce,
            hash: seal.hash,
        }
    }
}

/// A sealed block.
///
/// `timestamp` is not covered by `hash`; the digest commits to index, link,
/// content and nonce only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, contiguous from 0.
    pub index: u64,

    /// Creation time (Unix milliseconds).
    pub timestamp: i64,

    /// Batched content records, in submission order.
    pub content: Vec<ContentRecord>,

    /// Hash of the block at `index - 1`, or [`BlockHash::ZERO`] for genesis.
    pub previous_hash: BlockHash,

    /// Proof-of-work nonce.
    pub nonce: u64,

    /// Digest over (index, previous_hash, content, nonce).
    pub hash: BlockHash,
}

impl Block {
    /// Whether this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.index == GENESIS_INDEX
    }

    /// Recompute the digest from the stored fields.
    pub fn compute_hash(&self) -> Result<BlockHash, CoreError> {
        block_digest(self.index, &self.previous_hash, &self.content, self.nonce)
    }

    /// Creation time as ISO-8601.
    pub fn timestamp_iso(&self) -> String {
        iso8601(self.timestamp)
    }

    /// Read-only explorer rendering of this block.
    pub fn view(&self) -> BlockView {
        BlockView::from(self)
    }
}

/// Explorer rendering of a block, with ISO-8601 timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockView {
    pub index: u64,
    pub timestamp: String,
    pub content: Vec<RecordView>,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
}

/// Explorer rendering of a content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordView {
    pub content_id: String,
    pub hash: String,
    pub timestamp: String,
    pub title: String,
    pub author: String,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index,
            timestamp: block.timestamp_iso(),
            content: block.content.iter().map(RecordView::from).collect(),
            previous_hash: block.previous_hash.to_hex(),
            nonce: block.nonce,
            hash: block.hash.to_hex(),
        }
    }
}

impl From<&ContentRecord> for RecordView {
    fn from(record: &ContentRecord) -> Self {
        Self {
            content_id: record.content_id.to_string(),
            hash: record.fingerprint.to_hex(),
            timestamp: iso8601(record.timestamp),
            title: record.title.clone(),
            author: record.author.clone(),
        }
    }
}

/// Render Unix milliseconds as an RFC 3339 / ISO-8601 UTC string.
///
/// Out-of-range values fall back to the raw millisecond count.
pub fn iso8601(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fingerprint;

    fn sealed_genesis() -> Block {
        BlockSkeleton::genesis().with_timestamp(0).into_block(Seal {
            nonce: 14,
            hash: BlockHash::from_hex(
                "00aa84af2bed46767b746f907fb702e1848f844c0b7e4b92c4e48d589fbf0e41",
            )
            .unwrap(),
            attempts: 15,
        })
    }

    #[test]
    fn test_genesis_skeleton_shape() {
        let skeleton = BlockSkeleton::genesis();
        assert_eq!(skeleton.index, 0);
        assert!(skeleton.previous_hash.is_zero());
        assert!(skeleton.content.is_empty());
    }

    #[test]
    fn test_next_skeleton_links_to_tail() {
        let genesis = sealed_genesis();
        let next = BlockSkeleton::next(&genesis, vec![]);
        assert_eq!(next.index, 1);
        assert_eq!(next.previous_hash, genesis.hash);
    }

    #[test]
    fn test_compute_hash_matches_seal() {
        let genesis = sealed_genesis();
        assert!(genesis.is_genesis());
        assert_eq!(genesis.compute_hash().unwrap(), genesis.hash);
    }

    #[test]
    fn test_iso8601_rendering() {
        assert_eq!(iso8601(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso8601(1_700_000_000_000), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_view_renders_fields() {
        let record = ContentRecord::from_parts(
            "content-1",
            Fingerprint::from_bytes([0x01; 32]),
            1_700_000_000_000,
            "Hello",
            "alice",
        );
        let genesis = sealed_genesis();
        let block = BlockSkeleton::next(&genesis, vec![record])
            .with_timestamp(1_700_000_000_000)
            .into_block(Seal {
                nonce: 3,
                hash: BlockHash::from_bytes([0x00; 32]),
                attempts: 4,
            });

        let view = block.view();
        assert_eq!(view.index, 1);
        assert_eq!(view.timestamp, "2023-11-14T22:13:20.000Z");
        assert_eq!(view.previous_hash, genesis.hash.to_hex());
        assert_eq!(view.content.len(), 1);
        assert_eq!(view.content[0].hash, "01".repeat(32));
        assert_eq!(view.content[0].timestamp, "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_block_json_roundtrip() {
        let genesis = sealed_genesis();
        let json = serde_json::to_string(&genesis).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, genesis);
    }
}
