//! # Engine Configuration
//!
//! Initial values for a fresh [`IssuanceEngine`](crate::IssuanceEngine),
//! loadable from YAML:
//!
//! ```yaml
//! admin: "0x00000000000000000000000000000000000000ad"
//! max_supply: 10000
//! paused: true
//! commitment: "0x…"
//! ```
//!
//! Only `admin` is required.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sbt_core::{Address, Digest32};

/// Supply ceiling used when the configuration does not set one.
pub const DEFAULT_MAX_SUPPLY: u64 = 10_000;

fn default_max_supply() -> u64 {
    DEFAULT_MAX_SUPPLY
}

fn default_paused() -> bool {
    true
}

/// Initial engine parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Address holding the administrative role.
    pub admin: Address,
    /// Initial supply ceiling.
    #[serde(default = "default_max_supply")]
    pub max_supply: u64,
    /// Whether minting starts paused.
    #[serde(default = "default_paused")]
    pub paused: bool,
    /// Initial allowlist commitment.
    #[serde(default)]
    pub commitment: Digest32,
}

/// Errors loading an [`EngineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl EngineConfig {
    /// Defaults for everything but the admin.
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            max_supply: DEFAULT_MAX_SUPPLY,
            paused: true,
            commitment: Digest32::ZERO,
        }
    }

    pub fn with_max_supply(mut self, max_supply: u64) -> Self {
        self.max_supply = max_supply;
        self
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn with_commitment(mut self, commitment: Digest32) -> Self {
        self.commitment = commitment;
        self
    }

    /// Parse from a YAML (or JSON) document.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}
