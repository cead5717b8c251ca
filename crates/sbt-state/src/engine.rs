//! # Issuance Engine
//!
//! Single owner of all issuance state and the only entry point for callers.
//!
//! ## Claim protocol
//!
//! ```text
//! paused? ──▶ proof ──▶ ClaimLedger.reserve ──▶ SupplyGuard.reserve ──▶ TokenRegistry.mint
//!   │           │              │                       │                        │
//!   ▼           ▼              ▼                       ▼                        ▼
//! MintPaused  WhitelistInvalid ClaimExceeded   SupplyExceeded            SequenceMismatch
//!                                              (release claim)      (release supply + claim)
//! ```
//!
//! Each reservation step returns a receipt. When a later step fails, the
//! receipts taken so far are released in reverse order before the error is
//! returned, so a failed claim leaves every component exactly as it was.
//!
//! ## Administration
//!
//! `set_commitment`, `set_max_supply`, `set_paused` and `advance_round` take
//! the calling address explicitly and fail with `Unauthorized` unless it is
//! the configured admin.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sbt_core::{Address, Digest32, GroupId, IssuanceError, Round, TokenId, TokenRange};
use sbt_crypto::{verify_allowlist_proof, AllowlistProof};

use crate::config::EngineConfig;
use crate::event::IssuanceEvent;
use crate::ledger::{ClaimKey, ClaimLedger, ClaimRecord};
use crate::registry::{TokenRecord, TokenRegistry};
use crate::supply::{SupplyGuard, SupplyState};

// ─── Snapshot ────────────────────────────────────────────────────────

/// Every persisted field of an engine. The ownership index is not stored;
/// it is rebuilt from `tokens` on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub admin: Address,
    pub commitment: Digest32,
    pub paused: bool,
    pub round: Round,
    pub claims: Vec<ClaimRecord>,
    pub supply: SupplyState,
    pub tokens: Vec<TokenRecord>,
}

/// A snapshot that violates the registry invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("supply reports {issued} issued but snapshot holds {tokens} tokens")]
    SupplyMismatch { issued: u64, tokens: u64 },

    #[error("token at position {position} has id {id}; ids must run densely from 1")]
    NonSequentialId { position: u64, id: TokenId },

    #[error("token {id} owner does not match its burned flag")]
    InconsistentOwner { id: TokenId },

    #[error("claim record for round {round} is ahead of current round {current}")]
    ClaimOutOfRound { round: Round, current: Round },

    #[error("duplicate claim record for {claimant} in round {round}, group {group}")]
    DuplicateClaim {
        round: Round,
        group: GroupId,
        claimant: Address,
    },
}

// ─── Engine ──────────────────────────────────────────────────────────

/// Allowlist-gated soulbound token issuer.
#[derive(Debug, Clone)]
pub struct IssuanceEngine {
    admin: Address,
    commitment: Digest32,
    paused: bool,
    ledger: ClaimLedger,
    supply: SupplyGuard,
    registry: TokenRegistry,
    events: Vec<IssuanceEvent>,
}

impl IssuanceEngine {
    /// A fresh engine: nothing issued, round 0.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            admin: config.admin,
            commitment: config.commitment,
            paused: config.paused,
            ledger: ClaimLedger::new(),
            supply: SupplyGuard::new(config.max_supply),
            registry: TokenRegistry::new(),
            events: Vec::new(),
        }
    }

    // ── Caller operations ────────────────────────────────────────────

    /// Mint `requested` tokens to `caller` under the allowlist entry
    /// `(caller, cap, group)` proven by `proof`.
    ///
    /// Returns the newly assigned id range. A zero request that passes the
    /// pause and proof checks returns an empty range and changes nothing.
    pub fn claim(
        &mut self,
        caller: Address,
        requested: u64,
        cap: u64,
        group: GroupId,
        proof: &AllowlistProof,
    ) -> Result<TokenRange, IssuanceError> {
        let result = self.try_claim(caller, requested, cap, group, proof);
        if let Err(e) = &result {
            tracing::debug!(%caller, requested, cap, %group, kind = ?e.kind(), "claim rejected");
        }
        result
    }

    fn try_claim(
        &mut self,
        caller: Address,
        requested: u64,
        cap: u64,
        group: GroupId,
        proof: &AllowlistProof,
    ) -> Result<TokenRange, IssuanceError> {
        if self.paused {
            return Err(IssuanceError::MintPaused);
        }
        if !verify_allowlist_proof(&self.commitment, proof, &caller, cap, group) {
            return Err(IssuanceError::WhitelistInvalid);
        }
        if requested == 0 {
            return Ok(TokenRange::new(self.registry.next_id(), 0));
        }

        let key = self.ledger.current_key(group, caller);
        let claim = self.ledger.reserve(key, cap, requested)?;

        let supply = match self.supply.reserve(requested) {
            Ok(reservation) => reservation,
            Err(e) => {
                self.ledger.release(claim);
                return Err(e);
            }
        };

        let range = match self.registry.mint_sequential(caller, &supply) {
            Ok(range) => range,
            Err(e) => {
                self.supply.release(supply);
                self.ledger.release(claim);
                return Err(e);
            }
        };

        let round = claim.key().round;
        tracing::info!(
            %caller,
            %group,
            %round,
            first_id = %range.start,
            count = range.count,
            "minted"
        );
        self.events.push(IssuanceEvent::Minted {
            to: caller,
            group,
            round,
            range,
        });
        Ok(range)
    }

    /// Destroy `id`. Only the current owner may burn. Does not affect the
    /// supply count.
    pub fn burn(&mut self, caller: Address, id: TokenId) -> Result<(), IssuanceError> {
        match self.registry.burn(&caller, id) {
            Ok(()) => {
                tracing::info!(%caller, %id, "burned");
                self.events.push(IssuanceEvent::Burned { owner: caller, id });
                Ok(())
            }
            Err(e) => {
                tracing::debug!(%caller, %id, kind = ?e.kind(), "burn rejected");
                Err(e)
            }
        }
    }

    /// Tokens are soulbound: any transfer of a live token fails with
    /// `Soulbound`, an unknown or burned id with `TokenNotFound`.
    pub fn transfer(&self, caller: Address, to: Address, id: TokenId) -> Result<(), IssuanceError> {
        self.registry.owner_of(id)?;
        tracing::debug!(%caller, %to, %id, "transfer rejected: soulbound");
        Err(IssuanceError::Soulbound)
    }

    // ── Administration ───────────────────────────────────────────────

    fn ensure_admin(&self, caller: &Address, operation: &str) -> Result<(), IssuanceError> {
        if *caller != self.admin {
            tracing::debug!(%caller, operation, "unauthorized admin call");
            return Err(IssuanceError::Unauthorized);
        }
        Ok(())
    }

    /// Publish a new allowlist commitment.
    pub fn set_commitment(&mut self, caller: Address, commitment: Digest32) -> Result<(), IssuanceError> {
        self.ensure_admin(&caller, "set_commitment")?;
        self.commitment = commitment;
        tracing::info!(%commitment, "allowlist commitment set");
        self.events.push(IssuanceEvent::CommitmentSet { commitment });
        Ok(())
    }

    /// Replace the supply ceiling. May be set below `total_issued`, which
    /// halts minting until raised.
    pub fn set_max_supply(&mut self, caller: Address, max_supply: u64) -> Result<(), IssuanceError> {
        self.ensure_admin(&caller, "set_max_supply")?;
        let previous = self.supply.set_cap(max_supply);
        if max_supply < self.supply.total_issued() {
            tracing::warn!(
                max_supply,
                total_issued = self.supply.total_issued(),
                "max supply set below issued count; minting halted"
            );
        } else {
            tracing::info!(previous, max_supply, "max supply set");
        }
        self.events.push(IssuanceEvent::MaxSupplySet { previous, max_supply });
        Ok(())
    }

    /// Pause or resume minting. Burning is unaffected.
    pub fn set_paused(&mut self, caller: Address, paused: bool) -> Result<(), IssuanceError> {
        self.ensure_admin(&caller, "set_paused")?;
        self.paused = paused;
        tracing::info!(paused, "pause flag set");
        self.events.push(IssuanceEvent::PauseSet { paused });
        Ok(())
    }

    /// Start a new claiming round. Every claimant's allowance is fresh in the
    /// new round. Expected to be called while paused, but not required.
    pub fn advance_round(&mut self, caller: Address) -> Result<Round, IssuanceError> {
        self.ensure_admin(&caller, "advance_round")?;
        if !self.paused {
            tracing::warn!(round = %self.ledger.round(), "advancing round while minting is live");
        }
        let round = self.ledger.advance_round();
        tracing::info!(%round, "round advanced");
        self.events.push(IssuanceEvent::RoundAdvanced { round });
        Ok(round)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn owner_of(&self, id: TokenId) -> Result<Address, IssuanceError> {
        self.registry.owner_of(id)
    }

    /// Ids currently held by `owner`, ascending.
    pub fn tokens_of(&self, owner: &Address) -> Vec<TokenId> {
        self.registry.tokens_of(owner)
    }

    pub fn balance_of(&self, owner: &Address) -> u64 {
        self.registry.balance_of(owner)
    }

    /// Live (unburned) tokens.
    pub fn total_supply(&self) -> u64 {
        self.registry.live()
    }

    /// Tokens ever issued, burned ones included.
    pub fn total_issued(&self) -> u64 {
        self.supply.total_issued()
    }

    pub fn max_supply(&self) -> u64 {
        self.supply.max_supply()
    }

    /// Cumulative amount `claimant` has claimed in `group` during `round`.
    pub fn claimed(&self, round: Round, group: GroupId, claimant: Address) -> u64 {
        self.ledger.claimed(&ClaimKey {
            round,
            group,
            claimant,
        })
    }

    pub fn current_round(&self) -> Round {
        self.ledger.round()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn commitment(&self) -> Digest32 {
        self.commitment
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Committed events, oldest first.
    pub fn events(&self) -> &[IssuanceEvent] {
        &self.events
    }

    /// Take the event log, leaving it empty.
    pub fn drain_events(&mut self) -> Vec<IssuanceEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Capture every persisted field.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            admin: self.admin,
            commitment: self.commitment,
            paused: self.paused,
            round: self.ledger.round(),
            claims: self.ledger.records(),
            supply: self.supply.state(),
            tokens: self.registry.records(),
        }
    }

    /// Restore an engine from a snapshot, checking registry and ledger
    /// invariants.
    /// The event log starts empty.
    pub fn from_snapshot(snapshot: EngineSnapshot) -> Result<Self, SnapshotError> {
        let tokens = snapshot.tokens.len() as u64;
        if tokens != snapshot.supply.total_issued {
            return Err(SnapshotError::SupplyMismatch {
                issued: snapshot.supply.total_issued,
                tokens,
            });
        }
        for (position, record) in (TokenId::FIRST.get()..).zip(&snapshot.tokens) {
            if record.id != TokenId(position) {
                return Err(SnapshotError::NonSequentialId {
                    position,
                    id: record.id,
                });
            }
            if record.burned == record.owner.is_some() {
                return Err(SnapshotError::InconsistentOwner { id: record.id });
            }
        }

        let mut seen = BTreeSet::new();
        for record in &snapshot.claims {
            let key = record.key;
            if key.round > snapshot.round {
                return Err(SnapshotError::ClaimOutOfRound {
                    round: key.round,
                    current: snapshot.round,
                });
            }
            if !seen.insert(key) {
                return Err(SnapshotError::DuplicateClaim {
                    round: key.round,
                    group: key.group,
                    claimant: key.claimant,
                });
            }
        }

        Ok(Self {
            admin: snapshot.admin,
            commitment: snapshot.commitment,
            paused: snapshot.paused,
            ledger: ClaimLedger::from_records(snapshot.round, snapshot.claims),
            supply: SupplyGuard::from_state(snapshot.supply),
            registry: TokenRegistry::from_records(snapshot.tokens),
            events: Vec::new(),
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
