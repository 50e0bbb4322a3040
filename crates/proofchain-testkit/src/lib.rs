//! # Proofchain Testkit
//!
//! Testing utilities for Proofchain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known blocks with expected digests and nonces
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test scenarios
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the block digest encoding and the nonce search:
//!
//! ```rust
//! use proofchain_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, hash) in verify_all_vectors() {
//!     println!("{}: {} ({})", name, hash, matches);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use proofchain_testkit::generators::{skeleton_from_params, SkeletonParams};
//!
//! proptest! {
//!     #[test]
//!     fn preimage_is_deterministic(params: SkeletonParams) {
//!         let s = skeleton_from_params(&params);
//!         prop_assert_eq!(s.preimage().unwrap().digest(0), s.preimage().unwrap().digest(0));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use proofchain_testkit::fixtures::LedgerFixture;
//!
//! let fixture = LedgerFixture::fast().await;
//! fixture.submit_numbered(1, 5).await;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{fast_config, numbered_record, random_record, sealed_chain, LedgerFixture};
pub use generators::{skeleton_from_params, SkeletonParams};
pub use vectors::{all_vectors, skeleton_from_vector, verify_all_vectors, GoldenVector};
