//! # Allowlist Proof Verification
//!
//! A proof is the list of sibling hashes from a leaf to the root. Folding is
//! order-independent: at every level the running hash and the sibling are
//! sorted before hashing, so the verifier never needs to know which side the
//! sibling sits on.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use sbt_core::{Address, Digest32, GroupId};

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// Sibling path from an allowlist leaf to the commitment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowlistProof(pub Vec<Digest32>);

impl AllowlistProof {
    pub fn new(siblings: Vec<Digest32>) -> Self {
        Self(siblings)
    }

    /// The sibling hashes, leaf level first.
    pub fn siblings(&self) -> &[Digest32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Digest32>> for AllowlistProof {
    fn from(siblings: Vec<Digest32>) -> Self {
        Self(siblings)
    }
}

fn sha256_raw(input: &[u8]) -> Digest32 {
    let hash = Sha256::digest(input);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    Digest32(out)
}

/// Left-pad a `u64` to a 32-byte big-endian word.
fn word(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

/// Compute the allowlist leaf for an entry:
/// `SHA256(0x00 || address || cap || group)`.
pub fn allowlist_leaf(address: &Address, cap: u64, group: GroupId) -> Digest32 {
    let mut input = Vec::with_capacity(1 + 20 + 32 + 32);
    input.push(LEAF_PREFIX);
    input.extend_from_slice(address.as_bytes());
    input.extend_from_slice(&word(cap));
    input.extend_from_slice(&word(group.0));
    sha256_raw(&input)
}

/// Combine two child hashes: `SHA256(0x01 || min(a, b) || max(a, b))`.
///
/// Symmetric: `node_hash(a, b) == node_hash(b, a)`.
pub fn node_hash(a: &Digest32, b: &Digest32) -> Digest32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut input = Vec::with_capacity(65);
    input.push(NODE_PREFIX);
    input.extend_from_slice(lo.as_bytes());
    input.extend_from_slice(hi.as_bytes());
    sha256_raw(&input)
}

/// Verify that `(address, cap, group)` is a member of the allowlist
/// committed to by `commitment`.
///
/// Returns `false` for any mismatch. Malformed input is not an error here:
/// a proof either folds to the commitment or it does not.
pub fn verify_allowlist_proof(
    commitment: &Digest32,
    proof: &AllowlistProof,
    address: &Address,
    cap: u64,
    group: GroupId,
) -> bool {
    let folded = proof
        .siblings()
        .iter()
        .fold(allowlist_leaf(address, cap, group), |acc, sibling| {
            node_hash(&acc, sibling)
        });
    folded == *commitment
}
