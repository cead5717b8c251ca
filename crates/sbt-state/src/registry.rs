//! # Token Registry
//!
//! Authoritative record of every token ever minted. Ids are assigned densely
//! from 1 and are permanent: a burned id keeps its record (owner cleared,
//! `burned` set) and is never handed out again.
//!
//! The ownership index maps each address to the ids it currently holds. It
//! is maintained incrementally on mint and burn and is always the exact
//! inverse of the live `owner` fields.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use sbt_core::{Address, IssuanceError, TokenId, TokenRange};

use crate::supply::SupplyReservation;

/// One token's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: TokenId,
    /// Current owner. `None` once burned.
    pub owner: Option<Address>,
    pub burned: bool,
}

/// Sequential token table with an owner index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRegistry {
    tokens: BTreeMap<TokenId, TokenRecord>,
    owned: BTreeMap<Address, BTreeSet<TokenId>>,
    burned: u64,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records. The ownership index is derived from
    /// the records.
    pub fn from_records(records: impl IntoIterator<Item = TokenRecord>) -> Self {
        let mut registry = Self::new();
        for record in records {
            if record.burned {
                registry.burned += 1;
            } else if let Some(owner) = record.owner {
                registry.owned.entry(owner).or_default().insert(record.id);
            }
            registry.tokens.insert(record.id, record);
        }
        registry
    }

    /// The id the next mint will receive.
    pub fn next_id(&self) -> TokenId {
        TokenId(TokenId::FIRST.get() + self.tokens.len() as u64)
    }

    /// Number of ids ever assigned.
    pub fn minted(&self) -> u64 {
        self.tokens.len() as u64
    }

    /// Number of tokens not yet burned.
    pub fn live(&self) -> u64 {
        self.minted() - self.burned
    }

    /// Assign the ids granted by `reservation` to `owner`.
    ///
    /// Fails with `SequenceMismatch`, changing nothing, if the reservation
    /// does not start at [`next_id`](Self::next_id).
    pub fn mint_sequential(
        &mut self,
        owner: Address,
        reservation: &SupplyReservation,
    ) -> Result<TokenRange, IssuanceError> {
        let expected = reservation.first_id();
        let actual = self.next_id();
        if expected != actual {
            return Err(IssuanceError::SequenceMismatch { expected, actual });
        }
        let range = TokenRange::new(expected, reservation.count());
        let held = self.owned.entry(owner).or_default();
        for id in range.ids() {
            self.tokens.insert(
                id,
                TokenRecord {
                    id,
                    owner: Some(owner),
                    burned: false,
                },
            );
            held.insert(id);
        }
        if held.is_empty() {
            self.owned.remove(&owner);
        }
        Ok(range)
    }

    /// Destroy `id`. Only its current owner may do so.
    pub fn burn(&mut self, caller: &Address, id: TokenId) -> Result<(), IssuanceError> {
        let record = self
            .tokens
            .get_mut(&id)
            .filter(|r| !r.burned)
            .ok_or(IssuanceError::TokenNotFound)?;
        if record.owner.as_ref() != Some(caller) {
            return Err(IssuanceError::NotOwner);
        }
        record.burned = true;
        record.owner = None;
        self.burned += 1;

        if let Some(held) = self.owned.get_mut(caller) {
            held.remove(&id);
            if held.is_empty() {
                self.owned.remove(caller);
            }
        }
        Ok(())
    }

    /// Current owner of a live token.
    pub fn owner_of(&self, id: TokenId) -> Result<Address, IssuanceError> {
        self.tokens
            .get(&id)
            .and_then(|r| r.owner)
            .ok_or(IssuanceError::TokenNotFound)
    }

    /// Ids currently held by `owner`, ascending.
    pub fn tokens_of(&self, owner: &Address) -> Vec<TokenId> {
        self.owned
            .get(owner)
            .map(|held| held.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of live tokens held by `owner`.
    pub fn balance_of(&self, owner: &Address) -> u64 {
        self.owned.get(owner).map_or(0, |held| held.len() as u64)
    }

    /// Full record for `id`, burned or not.
    pub fn record(&self, id: TokenId) -> Option<&TokenRecord> {
        self.tokens.get(&id)
    }

    /// All records in id order.
    pub fn records(&self) -> Vec<TokenRecord> {
        self.tokens.values().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supply::SupplyGuard;

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xb0)
    }

    fn mint(reg: &mut TokenRegistry, guard: &mut SupplyGuard, owner: Address, n: u64) -> TokenRange {
        let r = guard.reserve(n).unwrap();
        reg.mint_sequential(owner, &r).unwrap()
    }

    #[test]
    fn test_mint_assigns_dense_ids() {
        let mut reg = TokenRegistry::new();
        let mut guard = SupplyGuard::new(100);
        let a = mint(&mut reg, &mut guard, alice(), 2);
        let b = mint(&mut reg, &mut guard, bob(), 3);
        assert_eq!(a, TokenRange::new(TokenId(1), 2));
        assert_eq!(b, TokenRange::new(TokenId(3), 3));
        assert_eq!(reg.tokens_of(&alice()), vec![TokenId(1), TokenId(2)]);
        assert_eq!(reg.tokens_of(&bob()), vec![TokenId(3), TokenId(4), TokenId(5)]);
        assert_eq!(reg.next_id(), TokenId(6));
    }

    #[test]
    fn test_mismatched_reservation_is_rejected() {
        let mut reg = TokenRegistry::new();
        let mut guard = SupplyGuard::new(100);
        let _ = guard.reserve(2).unwrap();
        let r = guard.reserve(1).unwrap();
        let before = reg.clone();
        assert_eq!(
            reg.mint_sequential(alice(), &r),
            Err(IssuanceError::SequenceMismatch {
                expected: TokenId(3),
                actual: TokenId(1)
            })
        );
        assert_eq!(reg, before);
    }

    #[test]
    fn test_burn_by_owner() {
        let mut reg = TokenRegistry::new();
        let mut guard = SupplyGuard::new(100);
        mint(&mut reg, &mut guard, alice(), 2);
        reg.burn(&alice(), TokenId(1)).unwrap();
        assert_eq!(reg.owner_of(TokenId(1)), Err(IssuanceError::TokenNotFound));
        assert_eq!(reg.tokens_of(&alice()), vec![TokenId(2)]);
        assert_eq!(reg.live(), 1);
        assert_eq!(reg.minted(), 2);
        let record = reg.record(TokenId(1)).unwrap();
        assert!(record.burned);
        assert_eq!(record.owner, None);
    }

    #[test]
    fn test_burn_by_non_owner() {
        let mut reg = TokenRegistry::new();
        let mut guard = SupplyGuard::new(100);
        mint(&mut reg, &mut guard, alice(), 1);
        assert_eq!(reg.burn(&bob(), TokenId(1)), Err(IssuanceError::NotOwner));
        assert_eq!(reg.owner_of(TokenId(1)), Ok(alice()));
    }

    #[test]
    fn test_burn_unknown_or_burned() {
        let mut reg = TokenRegistry::new();
        let mut guard = SupplyGuard::new(100);
        mint(&mut reg, &mut guard, alice(), 1);
        assert_eq!(reg.burn(&alice(), TokenId(2)), Err(IssuanceError::TokenNotFound));
        assert_eq!(reg.burn(&alice(), TokenId(0)), Err(IssuanceError::TokenNotFound));
        reg.burn(&alice(), TokenId(1)).unwrap();
        assert_eq!(reg.burn(&alice(), TokenId(1)), Err(IssuanceError::TokenNotFound));
    }

    #[test]
    fn test_burned_ids_are_not_reused() {
        let mut reg = TokenRegistry::new();
        let mut guard = SupplyGuard::new(100);
        mint(&mut reg, &mut guard, alice(), 3);
        reg.burn(&alice(), TokenId(3)).unwrap();
        let next = mint(&mut reg, &mut guard, bob(), 1);
        assert_eq!(next.start, TokenId(4));
    }

    #[test]
    fn test_owner_index_drops_empty_holders() {
        let mut reg = TokenRegistry::new();
        let mut guard = SupplyGuard::new(100);
        mint(&mut reg, &mut guard, alice(), 1);
        reg.burn(&alice(), TokenId(1)).unwrap();
        assert!(reg.tokens_of(&alice()).is_empty());
        assert_eq!(reg.balance_of(&alice()), 0);
        assert_eq!(reg, TokenRegistry::from_records(reg.records()));
    }

    #[test]
    fn test_zero_count_mint_leaves_index_clean() {
        let mut reg = TokenRegistry::new();
        let mut guard = SupplyGuard::new(100);
        let range = mint(&mut reg, &mut guard, alice(), 0);
        assert!(range.is_empty());
        assert_eq!(reg, TokenRegistry::new());
    }

    #[test]
    fn test_from_records_rebuilds_index() {
        let mut reg = TokenRegistry::new();
        let mut guard = SupplyGuard::new(100);
        mint(&mut reg, &mut guard, alice(), 2);
        mint(&mut reg, &mut guard, bob(), 2);
        reg.burn(&bob(), TokenId(3)).unwrap();
        let rebuilt = TokenRegistry::from_records(reg.records());
        assert_eq!(rebuilt, reg);
        assert_eq!(rebuilt.tokens_of(&bob()), vec![TokenId(4)]);
    }
}
