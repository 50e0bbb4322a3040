//! PendingBuffer: content records awaiting the next block.
//!
//! The buffer is not durable. Its owner serializes access to it together
//! with the block store, so a drain and the following append form one
//! critical section.

use std::collections::VecDeque;

use crate::content::ContentRecord;
use crate::types::Fingerprint;

/// Reference seal threshold.
pub const DEFAULT_SEAL_THRESHOLD: usize = 5;

/// Ordered accumulator of records since the last seal.
#[derive(Debug, Default, Clone)]
pub struct PendingBuffer {
    records: VecDeque<ContentRecord>,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the tail.
    pub fn push(&mut self, record: ContentRecord) {
        self.records.push_back(record);
    }

    /// Take every buffered record, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<ContentRecord> {
        self.records.drain(..).collect()
    }

    /// Put records back at the front, ahead of anything pushed since they
    /// were drained. Used when a seal fails after draining.
    pub fn restore(&mut self, records: Vec<ContentRecord>) {
        for record in records.into_iter().rev() {
            self.records.push_front(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Level trigger: true whenever the buffer holds at least `threshold`
    /// records.
    pub fn is_full(&self, threshold: usize) -> bool {
        self.records.len() >= threshold
    }

    /// Position of a fingerprint in the buffer, if pending.
    pub fn position_of(&self, fingerprint: &Fingerprint) -> Option<usize> {
        self.records
            .iter()
            .position(|r| &r.fingerprint == fingerprint)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentRecord> {
        self.records.iter()
    }
}
