//! Ledger configuration.

use std::path::Path;

use serde::Deserialize;

use proofchain_core::{SealLimits, ValidationOptions, DEFAULT_DIFFICULTY, DEFAULT_SEAL_THRESHOLD};

use crate::error::{LedgerError, Result};

/// Configuration for the [`Ledger`](crate::Ledger).
///
/// Every field has a default, so a TOML file only needs the keys it
/// overrides:
///
/// ```toml
/// difficulty = 3
/// seal_threshold = 10
///
/// [limits]
/// max_attempts = 50000000
/// timeout_ms = 60000   # 0 disables the deadline
///
/// [validation]
/// difficulty = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Required leading hex zeros for newly sealed blocks.
    pub difficulty: u32,
    /// Pending records that trigger a seal.
    pub seal_threshold: usize,
    /// Bounds on each nonce search.
    pub limits: SealLimits,
    /// What `is_valid` checks beyond digests and links.
    pub validation: ValidationOptions,
    /// Refuse submissions whose fingerprint is already pending or chained.
    pub reject_duplicates: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            seal_threshold: DEFAULT_SEAL_THRESHOLD,
            limits: SealLimits::default(),
            validation: ValidationOptions::narrow(),
            reject_duplicates: false,
        }
    }
}

impl LedgerConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Read a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Set the difficulty.
    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the seal threshold.
    pub fn with_seal_threshold(mut self, threshold: usize) -> Self {
        self.seal_threshold = threshold;
        self
    }

    /// Set the nonce search limits.
    pub fn with_limits(mut self, limits: SealLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Reject duplicate fingerprints on submit.
    pub fn rejecting_duplicates(mut self) -> Self {
        self.reject_duplicates = true;
        self
    }

    /// Check the values a ledger cannot run with.
    pub fn check(&self) -> Result<()> {
        if self.seal_threshold == 0 {
            return Err(LedgerError::Config("seal_threshold must be at least 1".into()));
        }
        if self.difficulty > 64 {
            return Err(LedgerError::Config(format!(
                "difficulty {} exceeds 64 hex digits",
                self.difficulty
            )));
        }
        if self.limits.max_attempts == 0 {
            return Err(LedgerError::Config("limits.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}
