//! # Supply Guard
//!
//! Counts every token ever issued against a ceiling. The count only grows:
//! burning a token never gives its slot back.
//!
//! The ceiling may be set below the current count, which halts issuance
//! until it is raised again.

use serde::{Deserialize, Serialize};

use sbt_core::{IssuanceError, TokenId};

/// Persisted supply counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyState {
    /// Tokens issued since genesis, burned ones included.
    pub total_issued: u64,
    /// Ceiling on `total_issued`.
    pub max_supply: u64,
}

/// Receipt for an applied supply reservation.
///
/// Carries the id range the registry must assign: the reservation and the
/// mint stay in lockstep because both derive from `total_issued` before the
/// reservation.
#[must_use = "a reservation must be minted or released"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplyReservation {
    first_id: TokenId,
    count: u64,
}

impl SupplyReservation {
    /// First id granted by this reservation.
    pub fn first_id(&self) -> TokenId {
        self.first_id
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Monotonic issuance counter with a configurable cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyGuard {
    state: SupplyState,
}

impl SupplyGuard {
    /// A guard with nothing issued and the given ceiling.
    pub fn new(max_supply: u64) -> Self {
        Self {
            state: SupplyState {
                total_issued: 0,
                max_supply,
            },
        }
    }

    pub fn from_state(state: SupplyState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> SupplyState {
        self.state
    }

    pub fn total_issued(&self) -> u64 {
        self.state.total_issued
    }

    pub fn max_supply(&self) -> u64 {
        self.state.max_supply
    }

    /// Reserve `amount` new tokens.
    ///
    /// Fails with `SupplyExceeded`, changing nothing, when the total would
    /// exceed the ceiling (or overflow).
    pub fn reserve(&mut self, amount: u64) -> Result<SupplyReservation, IssuanceError> {
        let prior = self.state.total_issued;
        let next = prior
            .checked_add(amount)
            .filter(|total| *total <= self.state.max_supply)
            .ok_or(IssuanceError::SupplyExceeded)?;
        self.state.total_issued = next;
        Ok(SupplyReservation {
            first_id: TokenId(prior.saturating_add(1)),
            count: amount,
        })
    }

    /// Undo the most recent reservation.
    pub fn release(&mut self, reservation: SupplyReservation) {
        debug_assert_eq!(
            self.state
                .total_issued
                .checked_sub(reservation.count)
                .map(|prior| TokenId(prior.saturating_add(1))),
            Some(reservation.first_id),
            "only the latest reservation can be released"
        );
        self.state.total_issued = self.state.total_issued.saturating_sub(reservation.count);
    }

    /// Replace the ceiling. Returns the previous value.
    pub fn set_cap(&mut self, max_supply: u64) -> u64 {
        std::mem::replace(&mut self.state.max_supply, max_supply)
    }
}
