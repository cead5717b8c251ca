//! # sbt-cli: Soulbound Issuance Command-Line Interface
//!
//! ## Subcommands
//!
//! - `allowlist`: compute the commitment for an allowlist file, extract a
//!   claimant's proof, or verify a proof against a commitment.
//! - `replay`: run a scripted sequence of claims, burns and admin calls
//!   against a fresh engine and report each outcome as a JSON line.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to the domain crates; no issuance logic lives here.

use std::path::Path;

use anyhow::{Context, Result};

use sbt_crypto::AllowlistEntry;

pub mod allowlist;
pub mod replay;

/// Read an allowlist from a YAML or JSON file: a list of
/// `{address, cap, group}` entries.
pub fn load_allowlist(path: &Path) -> Result<Vec<AllowlistEntry>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read allowlist: {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse allowlist: {}", path.display()))
}
