//! # 32-Byte Digests
//!
//! `Digest32` is the value type for allowlist leaves, proof elements and the
//! allowlist commitment itself. Ordering is lexicographic over the raw bytes,
//! which coincides with the numeric order of the digest read as a big-endian
//! 256-bit integer. The order-independent node hash relies on this.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A raw 32-byte hash value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest32(pub [u8; 32]);

impl Digest32 {
    /// The all-zero digest. Used as the commitment before one is published;
    /// no proof folds to it in practice.
    pub const ZERO: Digest32 = Digest32([0u8; 32]);

    /// Wrap raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as lowercase hex with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", encode_hex(&self.0))
    }

    /// Parse from 64 hex chars, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        decode_hex_fixed::<32>(s).map(Self)
    }
}

impl std::fmt::Display for Digest32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Digest32 {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Digest32 {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Digest32> for String {
    fn from(d: Digest32) -> String {
        d.to_hex()
    }
}

/// Encode bytes as lowercase hex without prefix.
pub(crate) fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode exactly `N` bytes from a hex string. A leading `0x`/`0X` and
/// surrounding whitespace are tolerated.
pub(crate) fn decode_hex_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if s.len() != N * 2 {
        return Err(ParseError::Length {
            expected: N * 2,
            actual: s.len(),
        });
    }
    let mut out = [0u8; N];
    if let Some(position) = s.bytes().position(|b| !b.is_ascii_hexdigit()) {
        return Err(ParseError::InvalidHex { position });
    }
    for (byte, pair) in out.iter_mut().zip(s.as_bytes().chunks_exact(2)) {
        *byte = (hex_value(pair[0]) << 4) | hex_value(pair[1]);
    }
    Ok(out)
}

fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    }
}
