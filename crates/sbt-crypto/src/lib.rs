//! # sbt-crypto: Allowlist Cryptography
//!
//! An allowlist of `(address, cap, group)` entries is published as a single
//! Merkle root. Claimants prove membership by supplying the sibling path
//! from their leaf to that root.
//!
//! - **Proof verification** (`proof.rs`): leaf hashing, order-independent
//!   node hashing, and `verify_allowlist_proof`. Pure functions, no state.
//! - **Tree construction** (`tree.rs`): `AllowlistTree` computes the root and
//!   per-entry proofs from the full allowlist. Used by the trusted layer that
//!   publishes the commitment, and by tests.
//!
//! ## Hashing
//!
//! Domain-separated SHA-256:
//! - Leaf: `SHA256(0x00 || address[20] || cap[32 BE] || group[32 BE])`.
//! - Node: `SHA256(0x01 || min(a, b) || max(a, b))`.
//!
//! Sorting the pair before hashing means a proof is just a list of siblings;
//! no left/right flags are carried.
//!
//! ## Crate Policy
//!
//! - Depends only on `sbt-core` internally.
//! - No mocking of hashing in tests: every test hashes for real.

pub mod proof;
pub mod tree;

pub use proof::{allowlist_leaf, node_hash, verify_allowlist_proof, AllowlistProof};
pub use tree::{AllowlistEntry, AllowlistError, AllowlistTree};
