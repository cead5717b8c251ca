//! # Issuance Invariant Property Tests
//!
//! Drives the engine with random operation sequences and checks after every
//! step that:
//! - a claimant never exceeds their cap within one round
//! - `total_issued` never decreases and never passes the ceiling in force
//!   when it was reached
//! - ids are dense from 1 with no gaps or reuse
//! - each owner's enumeration matches the live tokens they own
//! - a rejected operation leaves the snapshot unchanged
//! - snapshots restore to an engine with identical observable state

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use sbt_core::{Address, GroupId, Round, TokenId};
use sbt_crypto::{AllowlistEntry, AllowlistProof, AllowlistTree};
use sbt_state::{EngineConfig, IssuanceEngine};

const CLAIMANTS: u8 = 4;
const GROUPS: u64 = 2;

fn owner() -> Address {
    Address::repeat_byte(0xee)
}

fn cap_of(who: u8, group: u64) -> u64 {
    u64::from(who) + group * 2
}

fn tree() -> AllowlistTree {
    let mut entries = Vec::new();
    for who in 1..=CLAIMANTS {
        for group in 0..GROUPS {
            entries.push(AllowlistEntry::new(
                Address::repeat_byte(who),
                cap_of(who, group),
                GroupId(group),
            ));
        }
    }
    AllowlistTree::build(entries).unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Claim { who: u8, group: u64, amount: u64 },
    ClaimInflated { who: u8, amount: u64 },
    Burn { who: u8, id: u64 },
    SetMaxSupply(u64),
    TogglePause,
    AdvanceRound,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (1..=CLAIMANTS, 0..GROUPS, 0u64..8)
            .prop_map(|(who, group, amount)| Op::Claim { who, group, amount }),
        1 => (1..=CLAIMANTS, 1u64..4).prop_map(|(who, amount)| Op::ClaimInflated { who, amount }),
        3 => (1..=CLAIMANTS, 1u64..40).prop_map(|(who, id)| Op::Burn { who, id }),
        1 => (0u64..40).prop_map(Op::SetMaxSupply),
        1 => Just(Op::TogglePause),
        1 => Just(Op::AdvanceRound),
    ]
}

/// Independent bookkeeping the engine is checked against.
#[derive(Default)]
struct Model {
    claimed: BTreeMap<(Round, u64, u8), u64>,
    owners: BTreeMap<u64, u8>,
    issued: u64,
}

fn check_state(engine: &IssuanceEngine, model: &Model) -> Result<(), TestCaseError> {
    prop_assert_eq!(engine.total_issued(), model.issued);
    prop_assert_eq!(engine.total_supply(), model.owners.len() as u64);

    for who in 1..=CLAIMANTS {
        let addr = Address::repeat_byte(who);
        let expected: Vec<TokenId> = model
            .owners
            .iter()
            .filter(|(_, o)| **o == who)
            .map(|(id, _)| TokenId(*id))
            .collect();
        prop_assert_eq!(engine.balance_of(&addr), expected.len() as u64);
        prop_assert_eq!(engine.tokens_of(&addr), expected);
    }

    for ((round, group, who), amount) in &model.claimed {
        prop_assert!(*amount <= cap_of(*who, *group));
        prop_assert_eq!(
            engine.claimed(*round, GroupId(*group), Address::repeat_byte(*who)),
            *amount
        );
    }

    // Every id up to total_issued was assigned exactly once.
    let ids: BTreeSet<u64> = engine.snapshot().tokens.iter().map(|t| t.id.get()).collect();
    prop_assert_eq!(ids, (1..=model.issued).collect::<BTreeSet<_>>());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_operations_preserve_invariants(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let tree = tree();
        let config = EngineConfig::new(owner())
            .with_max_supply(30)
            .with_paused(false)
            .with_commitment(tree.root());
        let mut engine = IssuanceEngine::new(config);
        let mut model = Model::default();

        for op in ops {
            let before = engine.snapshot();
            let issued_before = engine.total_issued();

            let ok = match op {
                Op::Claim { who, group, amount } => {
                    let addr = Address::repeat_byte(who);
                    let cap = cap_of(who, group);
                    let proof = tree.proof_for(&addr, cap, GroupId(group)).unwrap();
                    let key = (engine.current_round(), group, who);
                    let already = model.claimed.get(&key).copied().unwrap_or(0);
                    let fits_cap = already + amount <= cap;
                    let fits_supply = engine.total_issued() + amount <= engine.max_supply();

                    let result = engine.claim(addr, amount, cap, GroupId(group), &proof);
                    if engine.is_paused() || amount == 0 {
                        prop_assert_eq!(result.is_ok(), !engine.is_paused());
                        if let Ok(range) = &result {
                            prop_assert!(range.is_empty());
                        }
                        false
                    } else {
                        prop_assert_eq!(result.is_ok(), fits_cap && fits_supply);
                        if let Ok(range) = result {
                            prop_assert_eq!(range.start, TokenId(model.issued + 1));
                            prop_assert_eq!(range.count, amount);
                            for id in range.ids() {
                                model.owners.insert(id.get(), who);
                            }
                            model.issued += amount;
                            *model.claimed.entry(key).or_default() += amount;
                            true
                        } else {
                            false
                        }
                    }
                }
                Op::ClaimInflated { who, amount } => {
                    let addr = Address::repeat_byte(who);
                    let cap = cap_of(who, 0);
                    let proof = tree.proof_for(&addr, cap, GroupId(0)).unwrap();
                    prop_assert!(engine.claim(addr, amount, cap + 1, GroupId(0), &proof).is_err());
                    false
                }
                Op::Burn { who, id } => {
                    let result = engine.burn(Address::repeat_byte(who), TokenId(id));
                    prop_assert_eq!(result.is_ok(), model.owners.get(&id) == Some(&who));
                    if result.is_ok() {
                        model.owners.remove(&id);
                    }
                    result.is_ok()
                }
                Op::SetMaxSupply(max) => {
                    engine.set_max_supply(owner(), max).unwrap();
                    true
                }
                Op::TogglePause => {
                    let paused = !engine.is_paused();
                    engine.set_paused(owner(), paused).unwrap();
                    true
                }
                Op::AdvanceRound => {
                    engine.advance_round(owner()).unwrap();
                    true
                }
            };

            if !ok {
                prop_assert_eq!(&engine.snapshot(), &before);
            }
            prop_assert!(engine.total_issued() >= issued_before);
            if engine.total_issued() > issued_before {
                prop_assert!(engine.total_issued() <= engine.max_supply());
            }
            check_state(&engine, &model)?;
        }

        let restored = IssuanceEngine::from_snapshot(engine.snapshot()).unwrap();
        prop_assert_eq!(restored.snapshot(), engine.snapshot());
        check_state(&restored, &model)?;
    }

    #[test]
    fn proof_from_another_claimant_never_verifies(
        holder in 1..=CLAIMANTS,
        thief in 1..=CLAIMANTS,
        group in 0..GROUPS,
    ) {
        prop_assume!(holder != thief);
        let tree = tree();
        let config = EngineConfig::new(owner())
            .with_paused(false)
            .with_commitment(tree.root());
        let mut engine = IssuanceEngine::new(config);
        let cap = cap_of(holder, group);
        let proof: AllowlistProof = tree
            .proof_for(&Address::repeat_byte(holder), cap, GroupId(group))
            .unwrap();

        let result = engine.claim(Address::repeat_byte(thief), 1, cap, GroupId(group), &proof);
        prop_assert_eq!(result, Err(sbt_core::IssuanceError::WhitelistInvalid));
        prop_assert_eq!(engine.total_issued(), 0);
    }
}
