//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers the issuance engine handles. These
//! prevent accidental confusion between the many integers in a claim: a
//! requested amount, a cap, a group number, a round and a token id are all
//! `u64` underneath, and only the amounts stay bare.

use serde::{Deserialize, Serialize};

use crate::digest::{decode_hex_fixed, encode_hex};
use crate::error::ParseError;

/// A 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Wrap raw bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// An address whose twenty bytes are all `byte`. Convenient for fixtures.
    pub fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Render as lowercase hex with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", encode_hex(&self.0))
    }

    /// Parse from 40 hex chars, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        decode_hex_fixed::<20>(s).map(Self)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Address {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> String {
        a.to_hex()
    }
}

/// Identifier of a minted token. Assigned densely from 1 and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u64);

impl TokenId {
    /// The first id ever assigned.
    pub const FIRST: TokenId = TokenId(1);

    /// Access the inner value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allowlist group an entry belongs to. Part of every allowlist leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Claiming epoch. Starts at 0; advanced only by the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Round(pub u64);

impl Round {
    /// The round after this one. Saturates at `u64::MAX`.
    pub fn next(self) -> Round {
        Round(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A contiguous run of freshly minted token ids.
///
/// An empty range still carries `start`: it is the id the next mint would
/// receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRange {
    /// First id in the range.
    pub start: TokenId,
    /// Number of ids.
    pub count: u64,
}

impl TokenRange {
    /// Construct a range of `count` ids beginning at `start`.
    pub fn new(start: TokenId, count: u64) -> Self {
        Self { start, count }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Last id in the range, or `None` when empty.
    pub fn last(&self) -> Option<TokenId> {
        if self.count == 0 {
            None
        } else {
            Some(TokenId(self.start.0 + (self.count - 1)))
        }
    }

    /// Iterate the ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = TokenId> {
        let start = self.start.0;
        (0..self.count).map(move |offset| TokenId(start + offset))
    }

    /// Whether `id` falls inside the range.
    pub fn contains(&self, id: TokenId) -> bool {
        id.0 >= self.start.0 && id.0 - self.start.0 < self.count
    }
}
