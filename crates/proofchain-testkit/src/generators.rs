//! Proptest generators for property-based testing.

use proptest::prelude::*;

use proofchain_core::{BlockHash, BlockSkeleton, ContentId, ContentRecord, Fingerprint};

/// Generate a random Fingerprint.
pub fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    any::<[u8; 32]>().prop_map(Fingerprint::from_bytes)
}

/// Generate a random BlockHash.
pub fn block_hash() -> impl Strategy<Value = BlockHash> {
    any::<[u8; 32]>().prop_map(BlockHash::from_bytes)
}

/// Generate a content identifier.
pub fn content_id() -> impl Strategy<Value = ContentId> {
    "[a-z0-9][a-z0-9-]{0,31}".prop_map(ContentId::new)
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=4_102_444_800_000i64
}

/// Generate free text, including characters JSON must escape.
pub fn text(max_len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            8 => proptest::char::range('a', 'z'),
            1 => Just('"'),
            1 => Just('\\'),
            1 => Just('\n'),
            1 => Just('é'),
        ],
        0..=max_len,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Generate a content record.
pub fn record() -> impl Strategy<Value = ContentRecord> {
    (content_id(), fingerprint(), timestamp(), text(40), text(20)).prop_map(
        |(id, fp, ts, title, author)| ContentRecord::from_parts(id, fp, ts, title, author),
    )
}

/// Generate up to `max_len` content records.
pub fn records(max_len: usize) -> impl Strategy<Value = Vec<ContentRecord>> {
    prop::collection::vec(record(), 0..=max_len)
}

/// Parameters for generating an unsealed block.
#[derive(Debug, Clone)]
pub struct SkeletonParams {
    pub index: u64,
    pub timestamp: i64,
    pub previous_hash: BlockHash,
    pub content: Vec<ContentRecord>,
}

impl Arbitrary for SkeletonParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (1u64..=1_000_000u64, timestamp(), block_hash(), records(8))
            .prop_map(|(index, timestamp, previous_hash, content)| SkeletonParams {
                index,
                timestamp,
                previous_hash,
                content,
            })
            .boxed()
    }
}

/// Build a skeleton from parameters.
pub fn skeleton_from_params(params: &SkeletonParams) -> BlockSkeleton {
    BlockSkeleton {
        index: params.index,
        timestamp: params.timestamp,
        previous_hash: params.previous_hash,
        content: params.content.clone(),
    }
}
