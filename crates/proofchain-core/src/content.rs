//! Content records: the payload unit batched into blocks.
//!
//! A record identifies one externally submitted piece of content by its
//! fingerprint. The content body itself never enters the ledger.

use serde::{Deserialize, Serialize};

use crate::types::{ContentId, Fingerprint};

/// One externally submitted content fingerprint.
///
/// Field order is part of the canonical block encoding: `content_id`,
/// `fingerprint`, `timestamp`, `title`, `author`. Do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Identifier assigned by the submitting system.
    pub content_id: ContentId,

    /// SHA-256 of the content body.
    pub fingerprint: Fingerprint,

    /// Submission time (Unix milliseconds).
    pub timestamp: i64,

    /// Human-readable title.
    pub title: String,

    /// Author label as shown to readers.
    pub author: String,
}

impl ContentRecord {
    /// Build a record for a content body, fingerprinting it and stamping the
    /// current time.
    pub fn new(
        content_id: impl Into<ContentId>,
        title: impl Into<String>,
        author: impl Into<String>,
        body: &[u8],
    ) -> Self {
        Self {
            content_id: content_id.into(),
            fingerprint: Fingerprint::of(body),
            timestamp: now_millis(),
            title: title.into(),
            author: author.into(),
        }
    }

    /// Build a record from an already computed fingerprint.
    pub fn from_parts(
        content_id: impl Into<ContentId>,
        fingerprint: Fingerprint,
        timestamp: i64,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            fingerprint,
            timestamp,
            title: title.into(),
            author: author.into(),
        }
    }

    /// Override the submission timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fingerprints_body() {
        let record = ContentRecord::new("c-1", "Title", "alice", b"hello world");
        assert_eq!(record.fingerprint, Fingerprint::of(b"hello world"));
        assert_eq!(record.content_id.as_str(), "c-1");
        assert!(record.timestamp > 0);
    }

    #[test]
    fn test_field_order_is_stable() {
        let record = ContentRecord::from_parts(
            "c-1",
            Fingerprint::from_bytes([0x11; 32]),
            42,
            "t",
            "a",
        );
        let json = serde_json::to_string(&record).unwrap();
        let expected = format!(
            r#"{{"content_id":"c-1","fingerprint":"{}","timestamp":42,"title":"t","author":"a"}}"#,
            "11".repeat(32)
        );
        assert_eq!(json, expected);
    }
}
