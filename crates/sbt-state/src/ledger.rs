//! # Claim Ledger
//!
//! Tracks how much each claimant has taken from their allowance, keyed by
//! `(round, group, claimant)`.
//!
//! Records are created lazily on first claim. Advancing the round does not
//! erase anything: later reservations simply address keys under the new
//! round, so old records become unreachable for claiming.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sbt_core::{Address, GroupId, IssuanceError, Round};

/// Key of a claim record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClaimKey {
    pub round: Round,
    pub group: GroupId,
    pub claimant: Address,
}

/// A claim record as persisted in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    #[serde(flatten)]
    pub key: ClaimKey,
    /// Cumulative amount issued under this key.
    pub claimed: u64,
}

/// Receipt for an applied reservation. Handing it back to
/// [`ClaimLedger::release`] undoes exactly that reservation.
#[must_use = "a reservation must be kept to release it if a later step fails"]
#[derive(Debug, PartialEq, Eq)]
pub struct ClaimReservation {
    key: ClaimKey,
    amount: u64,
    created: bool,
}

impl ClaimReservation {
    pub fn key(&self) -> &ClaimKey {
        &self.key
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// Per-round, per-group, per-claimant allowance accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimLedger {
    round: Round,
    records: BTreeMap<ClaimKey, u64>,
}

impl ClaimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted records.
    pub fn from_records(round: Round, records: impl IntoIterator<Item = ClaimRecord>) -> Self {
        Self {
            round,
            records: records.into_iter().map(|r| (r.key, r.claimed)).collect(),
        }
    }

    /// The current claiming round.
    pub fn round(&self) -> Round {
        self.round
    }

    /// The key `claimant` would claim under in the current round.
    pub fn current_key(&self, group: GroupId, claimant: Address) -> ClaimKey {
        ClaimKey {
            round: self.round,
            group,
            claimant,
        }
    }

    /// Cumulative amount claimed under `key`. Zero if never claimed.
    pub fn claimed(&self, key: &ClaimKey) -> u64 {
        self.records.get(key).copied().unwrap_or(0)
    }

    /// Reserve `amount` against `cap` for `key`.
    ///
    /// Fails with `ClaimExceeded`, changing nothing, when the cumulative
    /// total would exceed `cap` (or overflow).
    pub fn reserve(
        &mut self,
        key: ClaimKey,
        cap: u64,
        amount: u64,
    ) -> Result<ClaimReservation, IssuanceError> {
        let current = self.records.get(&key).copied();
        let next = current
            .unwrap_or(0)
            .checked_add(amount)
            .filter(|total| *total <= cap)
            .ok_or(IssuanceError::ClaimExceeded)?;
        self.records.insert(key, next);
        Ok(ClaimReservation {
            key,
            amount,
            created: current.is_none(),
        })
    }

    /// Undo a reservation made by [`reserve`](Self::reserve). A record the
    /// reservation created is removed again.
    pub fn release(&mut self, reservation: ClaimReservation) {
        if reservation.created {
            self.records.remove(&reservation.key);
        } else if let Some(claimed) = self.records.get_mut(&reservation.key) {
            *claimed = claimed.saturating_sub(reservation.amount);
        }
    }

    /// Move to the next round. Returns the new round.
    pub fn advance_round(&mut self) -> Round {
        self.round = self.round.next();
        self.round
    }

    /// All records, in key order.
    pub fn records(&self) -> Vec<ClaimRecord> {
        self.records
            .iter()
            .map(|(key, claimed)| ClaimRecord {
                key: *key,
                claimed: *claimed,
            })
            .collect()
    }
}
