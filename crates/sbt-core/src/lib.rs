//! # sbt-core: Foundational Types for Soulbound Issuance
//!
//! Defines the primitives every other crate in the workspace shares. It
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Address`, `TokenId`,
//!    `GroupId`, `Round` and `Digest32` are distinct types. A group number
//!    cannot be passed where a round is expected.
//!
//! 2. **One error taxonomy.** `IssuanceError` enumerates every caller-visible
//!    failure. Its `Display` strings are part of the external contract and
//!    must not change.
//!
//! 3. **Hex at the edges only.** Addresses and digests are fixed-size byte
//!    arrays internally; hex is parsed and rendered only at serialization
//!    boundaries.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sbt-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;

pub use digest::Digest32;
pub use error::{ErrorKind, IssuanceError, ParseError};
pub use identity::{Address, GroupId, Round, TokenId, TokenRange};
