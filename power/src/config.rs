//! Ledger configuration with TOML file support.

use crate::error::PowerError;
use crate::round::RoundClock;
use givpower_types::{HolderAddress, Timestamp, DAY_SECS, DECIMALS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Token-facing metadata reported by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            decimals: default_decimals(),
        }
    }
}

/// Configuration for a power ledger deployment.
///
/// Can be loaded from a TOML file via [`PowerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerConfig {
    /// Start of round 0, in unix seconds.
    #[serde(default)]
    pub initial_date: u64,

    /// Length of a round in seconds. Immutable once the ledger exists.
    #[serde(default = "default_round_duration")]
    pub round_duration: u64,

    /// Longest lock accepted, in rounds.
    #[serde(default = "default_max_lock_rounds")]
    pub max_lock_rounds: u64,

    /// Length of a funded reward period in seconds.
    #[serde(default = "default_reward_duration")]
    pub reward_duration: u64,

    /// May change the reward duration and the reward distribution address.
    #[serde(default)]
    pub owner: HolderAddress,

    /// The only caller allowed to fund reward periods.
    #[serde(default)]
    pub reward_distribution: HolderAddress,

    /// Reward token distributor that claimed rewards are allocated from.
    #[serde(default)]
    pub token_distro: HolderAddress,

    #[serde(default)]
    pub metadata: TokenMetadata,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_name() -> String {
    "GIVpower".to_string()
}

fn default_symbol() -> String {
    "POW".to_string()
}

fn default_decimals() -> u8 {
    DECIMALS as u8
}

fn default_round_duration() -> u64 {
    14 * DAY_SECS
}

fn default_max_lock_rounds() -> u64 {
    26
}

fn default_reward_duration() -> u64 {
    14 * DAY_SECS
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl PowerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PowerError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PowerError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PowerError> {
        let config: Self = toml::from_str(s).map_err(|e| PowerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, PowerError> {
        toml::to_string_pretty(self).map_err(|e| PowerError::Config(e.to_string()))
    }

    /// Reject values the ledger cannot run with.
    pub fn validate(&self) -> Result<(), PowerError> {
        if self.round_duration == 0 {
            return Err(PowerError::InvalidRoundDuration);
        }
        if self.reward_duration == 0 {
            return Err(PowerError::Config("reward_duration must be non-zero".into()));
        }
        if self.max_lock_rounds == 0 {
            return Err(PowerError::Config("max_lock_rounds must be non-zero".into()));
        }
        Ok(())
    }

    pub fn round_clock(&self) -> Result<RoundClock, PowerError> {
        RoundClock::new(Timestamp::new(self.initial_date), self.round_duration)
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            initial_date: 0,
            round_duration: default_round_duration(),
            max_lock_rounds: default_max_lock_rounds(),
            reward_duration: default_reward_duration(),
            owner: HolderAddress::ZERO,
            reward_distribution: HolderAddress::ZERO,
            token_distro: HolderAddress::ZERO,
            metadata: TokenMetadata::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
