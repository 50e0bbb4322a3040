//! Proof-of-work: search the nonce space for a digest with enough leading
//! hex zeros.
//!
//! The search is deterministic (it always starts at nonce 0 and returns the
//! smallest satisfying nonce) and bounded: [`SealLimits`] caps the attempts
//! and the wall-clock time, and a cancellation flag can stop it from outside.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::block::BlockSkeleton;
use crate::error::PowError;
use crate::types::{BlockHash, DIGEST_HEX_LEN};

/// Reference difficulty: two leading hex zeros.
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Default cap on nonce attempts per seal.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 10_000_000;

/// Default wall-clock budget per seal.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// How often (in attempts) the deadline and cancel flag are polled.
const POLL_INTERVAL: u64 = 4096;

/// Bounds on a single nonce search.
///
/// In serialized form `timeout_ms = 0` means no deadline, since TOML has no
/// null to spell `None` with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SealLimits {
    /// Maximum number of nonces to try.
    pub max_attempts: u64,
    /// Wall-clock budget in milliseconds; `None` means no deadline.
    #[serde(with = "zero_is_unbounded")]
    pub timeout_ms: Option<u64>,
}

mod zero_is_unbounded {
    use super::*;

    pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(value.unwrap_or(0))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok((millis != 0).then_some(millis))
    }
}

impl SealLimits {
    /// No deadline, attempts capped only by the nonce space.
    pub const UNBOUNDED: Self = Self {
        max_attempts: u64::MAX,
        timeout_ms: None,
    };

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for SealLimits {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout_ms: Some(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// The result of a successful search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seal {
    pub nonce: u64,
    pub hash: BlockHash,
    /// Number of digests computed, including the accepted one.
    pub attempts: u64,
}

/// Whether `hash` starts with at least `difficulty` hex `'0'` characters.
pub fn meets_difficulty(hash: &BlockHash, difficulty: u32) -> bool {
    hash.leading_zero_nibbles() >= difficulty
}

/// Search for the smallest nonce sealing `skeleton` at `difficulty`.
pub fn seal(
    skeleton: &BlockSkeleton,
    difficulty: u32,
    limits: &SealLimits,
) -> Result<Seal, PowError> {
    let never = AtomicBool::new(false);
    seal_with_cancel(skeleton, difficulty, limits, &never)
}

/// Like [`seal`], but stops with [`PowError::Cancelled`] once `cancel` is set.
pub fn seal_with_cancel(
    skeleton: &BlockSkeleton,
    difficulty: u32,
    limits: &SealLimits,
    cancel: &AtomicBool,
) -> Result<Seal, PowError> {
    if difficulty as usize > DIGEST_HEX_LEN {
        return Err(PowError::DifficultyOutOfRange(difficulty));
    }

    let preimage = skeleton.preimage()?;
    let started = Instant::now();
    let deadline = limits.timeout().map(|t| started + t);

    let mut nonce: u64 = 0;
    loop {
        if nonce >= limits.max_attempts {
            return Err(PowError::Exhausted { attempts: nonce });
        }

        if nonce % POLL_INTERVAL == 0 && nonce > 0 {
            if cancel.load(Ordering::Relaxed) {
                return Err(PowError::Cancelled { attempts: nonce });
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(PowError::TimedOut {
                        attempts: nonce,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    });
                }
            }
        }

        let hash = preimage.digest(nonce);
        if meets_difficulty(&hash, difficulty) {
            return Ok(Seal {
                nonce,
                hash,
                attempts: nonce + 1,
            });
        }

        nonce = match nonce.checked_add(1) {
            Some(n) => n,
            None => return Err(PowError::Exhausted { attempts: u64::MAX }),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentRecord;
    use crate::types::Fingerprint;

    const GENESIS_HASH: &str = "00aa84af2bed46767b746f907fb702e1848f844c0b7e4b92c4e48d589fbf0e41";

    #[test]
    fn test_genesis_seal_known_vector() {
        let skeleton = BlockSkeleton::genesis();
        let sealed = seal(&skeleton, 2, &SealLimits::default()).unwrap();
        assert_eq!(sealed.nonce, 14);
        assert_eq!(sealed.attempts, 15);
        assert_eq!(sealed.hash.to_hex(), GENESIS_HASH);
    }

    #[test]
    fn test_one_record_block_known_vector() {
        let genesis_hash = BlockHash::from_hex(GENESIS_HASH).unwrap();
        let record = ContentRecord::from_parts(
            "content-1",
            Fingerprint::of(b"hello world"),
            1_700_000_000_000,
            "Hello",
            "alice",
        );
        let skeleton = BlockSkeleton {
            index: 1,
            timestamp: 0,
            previous_hash: genesis_hash,
            content: vec![record],
        };

        let sealed = seal(&skeleton, 2, &SealLimits::default()).unwrap();
        assert_eq!(sealed.nonce, 20);
        assert_eq!(
            sealed.hash.to_hex(),
            "00c1ea6012a2f7b47f9c478498669979f126f8c4dbba0717619ea632ce78a00b"
        );
    }

    #[test]
    fn test_seal_is_reproducible() {
        let skeleton = BlockSkeleton::genesis();
        let a = seal(&skeleton, 3, &SealLimits::UNBOUNDED).unwrap();
        let b = seal(&skeleton, 3, &SealLimits::UNBOUNDED).unwrap();
        assert_eq!(a, b);
        assert!(a.hash.to_hex().starts_with("000"));
    }

    #[test]
    fn test_difficulty_zero_accepts_first_nonce() {
        let sealed = seal(&BlockSkeleton::genesis(), 0, &SealLimits::default()).unwrap();
        assert_eq!(sealed.nonce, 0);
        assert_eq!(sealed.attempts, 1);
    }

    #[test]
    fn test_exhausted_when_attempts_run_out() {
        let limits = SealLimits {
            max_attempts: 10,
            timeout_ms: None,
        };
        let result = seal(&BlockSkeleton::genesis(), 2, &limits);
        assert!(matches!(result, Err(PowError::Exhausted { attempts: 10 })));
    }

    #[test]
    fn test_cancelled_search() {
        let cancel = AtomicBool::new(true);
        let result = seal_with_cancel(
            &BlockSkeleton::genesis(),
            64,
            &SealLimits::UNBOUNDED,
            &cancel,
        );
        assert!(matches!(
            result,
            Err(PowError::Cancelled { attempts: POLL_INTERVAL })
        ));
    }

    #[test]
    fn test_times_out() {
        let limits = SealLimits {
            max_attempts: u64::MAX,
            timeout_ms: Some(0),
        };
        let result = seal(&BlockSkeleton::genesis(), 64, &limits);
        assert!(matches!(result, Err(PowError::TimedOut { .. })));
    }

    #[test]
    fn test_zero_timeout_serializes_as_unbounded() {
        let limits: SealLimits = serde_json::from_str(r#"{"timeout_ms":0}"#).unwrap();
        assert_eq!(limits.timeout_ms, None);
        assert_eq!(limits.max_attempts, DEFAULT_MAX_ATTEMPTS);

        let json = serde_json::to_string(&SealLimits::UNBOUNDED).unwrap();
        assert!(json.contains(r#""timeout_ms":0"#));

        let limits: SealLimits = serde_json::from_str(r#"{"timeout_ms":250}"#).unwrap();
        assert_eq!(limits.timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_rejects_impossible_difficulty() {
        let result = seal(&BlockSkeleton::genesis(), 65, &SealLimits::default());
        assert!(matches!(result, Err(PowError::DifficultyOutOfRange(65))));
    }

    #[test]
    fn test_meets_difficulty() {
        let hash = BlockHash::from_hex(GENESIS_HASH).unwrap();
        assert!(meets_difficulty(&hash, 0));
        assert!(meets_difficulty(&hash, 2));
        assert!(!meets_difficulty(&hash, 3));
    }
}
