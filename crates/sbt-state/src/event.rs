//! # Issuance Events
//!
//! The engine appends one event per committed operation. Failed operations
//! append nothing.

use serde::{Deserialize, Serialize};

use sbt_core::{Address, Digest32, GroupId, Round, TokenId, TokenRange};

/// A committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IssuanceEvent {
    /// Tokens minted to a claimant.
    Minted {
        to: Address,
        group: GroupId,
        round: Round,
        range: TokenRange,
    },
    /// A token was destroyed by its owner.
    Burned { owner: Address, id: TokenId },
    /// The allowlist commitment was replaced.
    CommitmentSet { commitment: Digest32 },
    /// The supply ceiling was replaced.
    MaxSupplySet { previous: u64, max_supply: u64 },
    /// Minting was paused or resumed.
    PauseSet { paused: bool },
    /// A new claiming round began.
    RoundAdvanced { round: Round },
}
