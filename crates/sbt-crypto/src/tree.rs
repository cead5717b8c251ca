//! # Allowlist Tree Construction
//!
//! Builds the full Merkle tree over an allowlist so the trusted layer can
//! publish its root and hand each claimant a proof.
//!
//! Leaves keep input order. Each level pairs adjacent nodes with the
//! order-independent [`node_hash`]; an unpaired trailing node is promoted to
//! the next level unchanged and contributes no sibling to proofs passing
//! through it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sbt_core::{Address, Digest32, GroupId};

use crate::proof::{allowlist_leaf, node_hash, AllowlistProof};

/// One authorized allowlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowlistEntry {
    /// Address entitled to claim.
    pub address: Address,
    /// Maximum cumulative amount per round.
    pub cap: u64,
    /// Allowlist group.
    #[serde(default)]
    pub group: GroupId,
}

impl AllowlistEntry {
    pub fn new(address: Address, cap: u64, group: GroupId) -> Self {
        Self {
            address,
            cap,
            group,
        }
    }

    /// The leaf hash of this entry.
    pub fn leaf(&self) -> Digest32 {
        allowlist_leaf(&self.address, self.cap, self.group)
    }
}

/// Errors building an allowlist tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllowlistError {
    /// An allowlist must contain at least one entry.
    #[error("allowlist is empty")]
    Empty,
}

/// A fully materialized allowlist Merkle tree.
#[derive(Debug, Clone)]
pub struct AllowlistTree {
    entries: Vec<AllowlistEntry>,
    /// `levels[0]` are the leaves; the last level holds only the root.
    levels: Vec<Vec<Digest32>>,
}

impl AllowlistTree {
    /// Build the tree over `entries`.
    pub fn build(entries: Vec<AllowlistEntry>) -> Result<Self, AllowlistError> {
        if entries.is_empty() {
            return Err(AllowlistError::Empty);
        }
        let mut levels = vec![entries.iter().map(AllowlistEntry::leaf).collect::<Vec<_>>()];
        while let Some(level) = levels.last() {
            if level.len() <= 1 {
                break;
            }
            let next = level
                .chunks(2)
                .filter_map(|pair| pair.iter().copied().reduce(|l, r| node_hash(&l, &r)))
                .collect();
            levels.push(next);
        }
        Ok(Self { entries, levels })
    }

    /// The commitment to publish.
    pub fn root(&self) -> Digest32 {
        // `build` guarantees at least one level with exactly one node at the top.
        self.levels
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or(Digest32::ZERO)
    }

    pub fn entries(&self) -> &[AllowlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Proof for the entry at `index`, or `None` when out of range.
    pub fn proof(&self, index: usize) -> Option<AllowlistProof> {
        if index >= self.entries.len() {
            return None;
        }
        let mut pos = index;
        let mut siblings = Vec::new();
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = pos ^ 1;
            if let Some(hash) = level.get(sibling) {
                siblings.push(*hash);
            }
            pos /= 2;
        }
        Some(AllowlistProof::new(siblings))
    }

    /// Proof for the first entry matching `(address, cap, group)`.
    pub fn proof_for(&self, address: &Address, cap: u64, group: GroupId) -> Option<AllowlistProof> {
        let index = self
            .entries
            .iter()
            .position(|e| e.address == *address && e.cap == cap && e.group == group)?;
        self.proof(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::verify_allowlist_proof;

    fn entries(n: u8) -> Vec<AllowlistEntry> {
        (1..=n)
            .map(|i| AllowlistEntry::new(Address::repeat_byte(i), u64::from(i), GroupId(0)))
            .collect()
    }

    #[test]
    fn test_empty_allowlist_rejected() {
        assert_eq!(
            AllowlistTree::build(Vec::new()).unwrap_err(),
            AllowlistError::Empty
        );
    }

    #[test]
    fn test_single_entry_root_is_leaf() {
        let list = entries(1);
        let tree = AllowlistTree::build(list.clone()).unwrap();
        assert_eq!(tree.root(), list[0].leaf());
        assert!(tree.proof(0).unwrap().is_empty());
    }

    #[test]
    fn test_four_entries_every_proof_verifies() {
        let list = entries(4);
        let tree = AllowlistTree::build(list.clone()).unwrap();
        let root = tree.root();
        for (i, e) in list.iter().enumerate() {
            let proof = tree.proof(i).unwrap();
            assert_eq!(proof.len(), 2);
            assert!(verify_allowlist_proof(&root, &proof, &e.address, e.cap, e.group));
        }
    }

    #[test]
    fn test_odd_count_promotes_trailing_node() {
        let list = entries(5);
        let tree = AllowlistTree::build(list.clone()).unwrap();
        let root = tree.root();
        // Entry 4 is promoted twice and only pairs at the top.
        assert_eq!(tree.proof(4).unwrap().len(), 1);
        for (i, e) in list.iter().enumerate() {
            let proof = tree.proof(i).unwrap();
            assert!(verify_allowlist_proof(&root, &proof, &e.address, e.cap, e.group));
        }
    }

    #[test]
    fn test_proof_for_unknown_entry_is_none() {
        let tree = AllowlistTree::build(entries(3)).unwrap();
        assert!(tree
            .proof_for(&Address::repeat_byte(9), 9, GroupId(0))
            .is_none());
        assert!(tree.proof(3).is_none());
    }

    #[test]
    fn test_proof_does_not_transfer_to_other_address() {
        let tree = AllowlistTree::build(entries(4)).unwrap();
        let proof = tree
            .proof_for(&Address::repeat_byte(2), 2, GroupId(0))
            .unwrap();
        assert!(!verify_allowlist_proof(
            &tree.root(),
            &proof,
            &Address::repeat_byte(3),
            2,
            GroupId(0)
        ));
    }

    #[test]
    fn test_entry_deserializes_with_default_group() {
        let json = format!("{{\"address\":\"0x{}\",\"cap\":3}}", "01".repeat(20));
        let e: AllowlistEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(e.group, GroupId(0));
        assert_eq!(e.cap, 3);
    }
}
