//! # Error Types
//!
//! `IssuanceError` is the complete set of caller-visible outcomes of the
//! issuance engine. Every variant is terminal: none is retried internally,
//! and every failing operation leaves engine state exactly as it found it.
//!
//! The `Display` strings are the messages existing integrations match on.
//! They are fixed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::TokenId;

/// Failure outcomes of claim, burn, query and administrative operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssuanceError {
    /// Minting is paused.
    #[error("mint is paused")]
    MintPaused,

    /// The supplied proof does not fold to the published commitment for
    /// this caller, cap and group.
    #[error("You don't have a whitelist")]
    WhitelistInvalid,

    /// The caller's allowance for the current round and group is exhausted.
    #[error("claim is over max amount")]
    ClaimExceeded,

    /// The global issuance ceiling would be exceeded.
    #[error("over max supply")]
    SupplyExceeded,

    /// The caller does not own the token.
    #[error("Only the owner can burn")]
    NotOwner,

    /// The token was never minted or has been burned.
    #[error("ERC721: invalid token ID")]
    TokenNotFound,

    /// A non-admin caller invoked an administrative operation.
    #[error("Ownable: caller is not the owner")]
    Unauthorized,

    /// Tokens cannot change hands once minted.
    #[error("token is soulbound and cannot be transferred")]
    Soulbound,

    /// The registry's next id disagrees with the supply reservation.
    #[error("token id sequence mismatch: expected {expected}, got {actual}")]
    SequenceMismatch {
        /// First id the supply reservation granted.
        expected: TokenId,
        /// Next id the registry would have assigned.
        actual: TokenId,
    },
}

/// Payload-free discriminant of [`IssuanceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MintPaused,
    WhitelistInvalid,
    ClaimExceeded,
    SupplyExceeded,
    NotOwner,
    TokenNotFound,
    Unauthorized,
    Soulbound,
    SequenceMismatch,
}

impl IssuanceError {
    /// The stable kind tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MintPaused => ErrorKind::MintPaused,
            Self::WhitelistInvalid => ErrorKind::WhitelistInvalid,
            Self::ClaimExceeded => ErrorKind::ClaimExceeded,
            Self::SupplyExceeded => ErrorKind::SupplyExceeded,
            Self::NotOwner => ErrorKind::NotOwner,
            Self::TokenNotFound => ErrorKind::TokenNotFound,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Soulbound => ErrorKind::Soulbound,
            Self::SequenceMismatch { .. } => ErrorKind::SequenceMismatch,
        }
    }
}

/// Error parsing a hex-encoded address or digest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Wrong number of hex characters after stripping the prefix.
    #[error("expected {expected} hex chars, got {actual}")]
    Length {
        /// Required number of hex characters.
        expected: usize,
        /// Number supplied.
        actual: usize,
    },

    /// A non-hex character was found.
    #[error("invalid hex at position {position}")]
    InvalidHex {
        /// Offset of the offending character.
        position: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_messages_are_exact() {
        assert_eq!(IssuanceError::MintPaused.to_string(), "mint is paused");
        assert_eq!(
            IssuanceError::WhitelistInvalid.to_string(),
            "You don't have a whitelist"
        );
        assert_eq!(
            IssuanceError::ClaimExceeded.to_string(),
            "claim is over max amount"
        );
        assert_eq!(IssuanceError::SupplyExceeded.to_string(), "over max supply");
        assert_eq!(IssuanceError::NotOwner.to_string(), "Only the owner can burn");
        assert_eq!(
            IssuanceError::TokenNotFound.to_string(),
            "ERC721: invalid token ID"
        );
        assert_eq!(
            IssuanceError::Unauthorized.to_string(),
            "Ownable: caller is not the owner"
        );
    }

    #[test]
    fn test_sequence_mismatch_message() {
        let err = IssuanceError::SequenceMismatch {
            expected: TokenId(4),
            actual: TokenId(7),
        };
        assert_eq!(
            err.to_string(),
            "token id sequence mismatch: expected 4, got 7"
        );
        assert_eq!(err.kind(), ErrorKind::SequenceMismatch);
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&IssuanceError::ClaimExceeded.kind()).unwrap();
        assert_eq!(json, "\"CLAIM_EXCEEDED\"");
    }
}
