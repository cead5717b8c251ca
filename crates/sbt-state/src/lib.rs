//! # sbt-state: Issuance State Machine
//!
//! Implements allowlist-gated issuance of soulbound tokens.
//!
//! ## Components
//!
//! - **ClaimLedger** (`ledger.rs`): cumulative claimed amount per
//!   `(round, group, claimant)`. Advancing the round opens a fresh keyspace.
//!
//! - **SupplyGuard** (`supply.rs`): total tokens ever issued against a
//!   configurable ceiling. Never decremented by burns.
//!
//! - **TokenRegistry** (`registry.rs`): sequential id assignment, ownership,
//!   burn, and per-owner enumeration.
//!
//! - **IssuanceEngine** (`engine.rs`): the only entry point for callers.
//!   Orchestrates the above so that every claim commits completely or not
//!   at all.
//!
//! ## Execution Model
//!
//! Each operation takes `&mut IssuanceEngine` and runs to completion. The
//! surrounding environment serializes invocations; the engine does no
//! locking of its own.

pub mod config;
pub mod engine;
pub mod event;
pub mod ledger;
pub mod registry;
pub mod supply;

pub use config::{ConfigError, EngineConfig, DEFAULT_MAX_SUPPLY};
pub use engine::{EngineSnapshot, IssuanceEngine, SnapshotError};
pub use event::IssuanceEvent;
pub use ledger::{ClaimKey, ClaimLedger, ClaimRecord, ClaimReservation};
pub use registry::{TokenRecord, TokenRegistry};
pub use supply::{SupplyGuard, SupplyReservation, SupplyState};
