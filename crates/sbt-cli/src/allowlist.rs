//! # Allowlist Subcommand
//!
//! Computes commitments and proofs for the trusted layer, and lets a
//! claimant check a proof offline before submitting it.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use sbt_core::{Address, Digest32, GroupId};
use sbt_crypto::{verify_allowlist_proof, AllowlistProof, AllowlistTree};

use crate::load_allowlist;

/// Arguments for the `sbt allowlist` subcommand.
#[derive(Args, Debug)]
pub struct AllowlistArgs {
    #[command(subcommand)]
    pub command: AllowlistCommand,
}

/// Allowlist subcommands.
#[derive(Subcommand, Debug)]
pub enum AllowlistCommand {
    /// Print the commitment (Merkle root) of an allowlist file.
    Root {
        /// YAML or JSON list of `{address, cap, group}` entries.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the proof for one allowlist entry as JSON.
    Proof {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        address: Address,
        #[arg(long)]
        cap: u64,
        #[arg(long, default_value_t = 0)]
        group: u64,
    },

    /// Check a proof against a commitment. Exits 0 iff valid.
    Verify {
        #[arg(long)]
        root: Digest32,
        #[arg(long)]
        address: Address,
        #[arg(long)]
        cap: u64,
        #[arg(long, default_value_t = 0)]
        group: u64,
        /// Comma-separated sibling hashes, leaf level first.
        #[arg(long, value_delimiter = ',')]
        proof: Vec<Digest32>,
    },
}

/// Execute the allowlist subcommand.
pub fn run_allowlist(args: &AllowlistArgs) -> Result<u8> {
    match &args.command {
        AllowlistCommand::Root { file } => {
            let tree = build_tree(file)?;
            tracing::info!(entries = tree.len(), "allowlist tree built");
            println!("{}", tree.root());
            Ok(0)
        }
        AllowlistCommand::Proof {
            file,
            address,
            cap,
            group,
        } => {
            let tree = build_tree(file)?;
            let Some(proof) = tree.proof_for(address, *cap, GroupId(*group)) else {
                bail!("no allowlist entry for {address} with cap {cap} in group {group}");
            };
            println!("{}", serde_json::to_string_pretty(&proof)?);
            Ok(0)
        }
        AllowlistCommand::Verify {
            root,
            address,
            cap,
            group,
            proof,
        } => {
            let proof = AllowlistProof::new(proof.clone());
            if verify_allowlist_proof(root, &proof, address, *cap, GroupId(*group)) {
                println!("OK: proof valid");
                Ok(0)
            } else {
                println!("FAIL: proof does not match {root}");
                Ok(1)
            }
        }
    }
}

fn build_tree(file: &std::path::Path) -> Result<AllowlistTree> {
    let entries = load_allowlist(file)?;
    AllowlistTree::build(entries).with_context(|| format!("cannot build tree from {}", file.display()))
}
