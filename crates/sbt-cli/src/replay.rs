//! # Replay Subcommand
//!
//! Applies a scripted sequence of operations to a fresh engine and prints
//! one JSON outcome per step.
//!
//! ```yaml
//! config:
//!   admin: "0x00000000000000000000000000000000000000ad"
//!   paused: false
//! allowlist:
//!   - { address: "0x…01", cap: 1 }
//! steps:
//!   - { op: claim, caller: "0x…01", amount: 1, cap: 1 }
//!   - { op: burn, caller: "0x…01", id: 1 }
//! ```
//!
//! When `allowlist` is present its root becomes the initial commitment, and
//! claim steps without an explicit `proof` get one looked up from the tree.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};

use sbt_core::{Address, Digest32, GroupId, IssuanceError, TokenId};
use sbt_crypto::{AllowlistEntry, AllowlistProof, AllowlistTree};
use sbt_state::{EngineConfig, EngineSnapshot, IssuanceEngine};

/// Arguments for the `sbt replay` subcommand.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// YAML script with optional `config` and `allowlist`, and `steps`.
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Write the final engine snapshot to this file as JSON.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

/// A replay script.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub allowlist: Vec<AllowlistEntry>,
    pub steps: Vec<Step>,
}

/// One scripted operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Claim {
        caller: Address,
        amount: u64,
        cap: u64,
        #[serde(default)]
        group: GroupId,
        #[serde(default)]
        proof: Option<AllowlistProof>,
    },
    Burn {
        caller: Address,
        id: TokenId,
    },
    Transfer {
        caller: Address,
        to: Address,
        id: TokenId,
    },
    SetCommitment {
        caller: Address,
        commitment: Digest32,
    },
    SetMaxSupply {
        caller: Address,
        max_supply: u64,
    },
    SetPaused {
        caller: Address,
        paused: bool,
    },
    AdvanceRound {
        caller: Address,
    },
    OwnerOf {
        id: TokenId,
    },
    TokensOf {
        owner: Address,
    },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Self::Claim { .. } => "claim",
            Self::Burn { .. } => "burn",
            Self::Transfer { .. } => "transfer",
            Self::SetCommitment { .. } => "set_commitment",
            Self::SetMaxSupply { .. } => "set_max_supply",
            Self::SetPaused { .. } => "set_paused",
            Self::AdvanceRound { .. } => "advance_round",
            Self::OwnerOf { .. } => "owner_of",
            Self::TokensOf { .. } => "tokens_of",
        }
    }
}

/// Execute the replay subcommand.
pub fn run_replay(args: &ReplayArgs, config_path: Option<&Path>) -> Result<u8> {
    let text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read script: {}", args.script.display()))?;
    let mut script: Script = serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse script: {}", args.script.display()))?;

    if let Some(path) = config_path {
        script.config = Some(
            EngineConfig::from_yaml_file(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?,
        );
    }

    let (outcomes, snapshot) = replay(script)?;
    for outcome in &outcomes {
        println!("{outcome}");
    }

    if let Some(out) = &args.snapshot {
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(out, json)
            .with_context(|| format!("failed to write snapshot: {}", out.display()))?;
        tracing::info!(path = %out.display(), "snapshot written");
    }
    Ok(0)
}

/// Run `script` against a fresh engine. Returns one outcome per step and
/// the final snapshot.
pub fn replay(script: Script) -> Result<(Vec<Value>, EngineSnapshot)> {
    let Some(mut config) = script.config else {
        bail!("no engine config: pass --config or add a `config` section to the script");
    };

    let tree = if script.allowlist.is_empty() {
        None
    } else {
        let tree = AllowlistTree::build(script.allowlist).context("invalid allowlist")?;
        config.commitment = tree.root();
        Some(tree)
    };

    let mut engine = IssuanceEngine::new(config);
    let mut outcomes = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.into_iter().enumerate() {
        let op = step.name();
        let result = apply(&mut engine, tree.as_ref(), step);
        tracing::debug!(index, op, ok = result.is_ok(), "step applied");
        outcomes.push(match result {
            Ok(value) => json!({ "step": index, "op": op, "ok": true, "result": value }),
            Err(e) => json!({
                "step": index,
                "op": op,
                "ok": false,
                "error": e.kind(),
                "message": e.to_string(),
            }),
        });
    }
    Ok((outcomes, engine.snapshot()))
}

fn apply(
    engine: &mut IssuanceEngine,
    tree: Option<&AllowlistTree>,
    step: Step,
) -> Result<Value, IssuanceError> {
    match step {
        Step::Claim {
            caller,
            amount,
            cap,
            group,
            proof,
        } => {
            let proof = proof
                .or_else(|| tree.and_then(|t| t.proof_for(&caller, cap, group)))
                .unwrap_or_default();
            let range = engine.claim(caller, amount, cap, group, &proof)?;
            Ok(json!(range.ids().collect::<Vec<_>>()))
        }
        Step::Burn { caller, id } => engine.burn(caller, id).map(|()| Value::Null),
        Step::Transfer { caller, to, id } => engine.transfer(caller, to, id).map(|()| Value::Null),
        Step::SetCommitment { caller, commitment } => engine
            .set_commitment(caller, commitment)
            .map(|()| Value::Null),
        Step::SetMaxSupply { caller, max_supply } => engine
            .set_max_supply(caller, max_supply)
            .map(|()| Value::Null),
        Step::SetPaused { caller, paused } => {
            engine.set_paused(caller, paused).map(|()| Value::Null)
        }
        Step::AdvanceRound { caller } => engine.advance_round(caller).map(|round| json!(round)),
        Step::OwnerOf { id } => engine.owner_of(id).map(|owner| json!(owner)),
        Step::TokensOf { owner } => Ok(json!(engine.tokens_of(&owner))),
    }
}
