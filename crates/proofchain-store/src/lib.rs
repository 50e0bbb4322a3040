//! # Proofchain Store
//!
//! Storage abstraction for Proofchain. Provides a trait-based interface
//! for block persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts block storage behind the [`BlockStore`] trait,
//! allowing the ledger to be storage-agnostic. The primary implementation
//! is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`BlockStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`BlockId`] - Index and hash of an appended block
//! - [`RecordPosition`] - Where a content fingerprint was chained
//!
//! ## Usage
//!
//! ```rust,no_run
//! use proofchain_store::{BlockStore, SqliteStore};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let height = store.count().await.unwrap();
//!     println!("{} blocks stored", height);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Append-only**: Blocks are never updated or deleted
//! - **Append-if-tail**: An append at any index other than the current count returns `Conflict`
//! - **Unique hashes**: A second block with an existing hash returns `DuplicateHash`

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{BlockId, BlockStore, RecordPosition, StoreExt};
