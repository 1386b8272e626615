//! Engine configuration
//!
//! Layered, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `VERDICT__<SECTION>__<FIELD>` environment variables
//!
//! ```toml
//! [consensus]
//! min_voters = 30
//!
//! [settlement]
//! floor_multipliers_bps = [15000, 12000, 10000]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use verdict_consensus::{ArbiterConfig, ConsensusConfig, WeightConfig};
use verdict_core::{Result, VerdictError, BPS_ONE};
use verdict_economics::{EconomicsConfig, SettlementConfig};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "VERDICT";

/// Separator between prefix, section, and field in environment keys
pub const ENV_SEPARATOR: &str = "__";

/// Complete engine configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub weights: WeightConfig,

    #[serde(default)]
    pub consensus: ConsensusConfig,

    #[serde(default)]
    pub arbiter: ArbiterConfig,

    #[serde(default)]
    pub economics: EconomicsConfig,

    #[serde(default)]
    pub settlement: SettlementConfig,
}

impl EngineConfig {
    /// Load defaults, then `path` if given, then the environment, and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&EngineConfig::default()).map_err(config_error)?;
        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            tracing::debug!("Loading engine configuration from {}", path.display());
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: EngineConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| VerdictError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VerdictError::Config(e.to_string()))
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let weights = &self.weights;
        if !weights.democracy_threshold.is_positive() {
            return invalid("weights.democracy_threshold must be positive");
        }
        if weights.xp_scale == 0 {
            return invalid("weights.xp_scale must be positive");
        }
        if weights.age_max_days == 0 {
            return invalid("weights.age_max_days must be positive");
        }
        if weights.max_democratic_multiplier_bps < BPS_ONE {
            return invalid("weights.max_democratic_multiplier_bps must be at least 10000");
        }

        if self.consensus.min_voters == 0 {
            return invalid("consensus.min_voters must be positive");
        }
        if self.consensus.min_ratio_bps < BPS_ONE {
            return invalid("consensus.min_ratio_bps must be at least 10000");
        }

        if !self.arbiter.weights_balanced() {
            return invalid("arbiter weights must sum to 10000 bps");
        }

        let economics = &self.economics;
        if economics.base_fee.is_negative() {
            return invalid("economics.base_fee must not be negative");
        }
        if economics
            .discount_tiers
            .windows(2)
            .any(|w| w[0].max_days >= w[1].max_days)
        {
            return invalid("economics.discount_tiers must be ordered by increasing max_days");
        }
        if economics
            .discount_tiers
            .iter()
            .any(|t| t.multiplier_bps == 0 || t.multiplier_bps > BPS_ONE)
        {
            return invalid("economics.discount_tiers multipliers must be in (0, 10000]");
        }

        let settlement = &self.settlement;
        if settlement.min_engagement == 0 {
            return invalid("settlement.min_engagement must be positive");
        }
        if settlement.top_split_bps.iter().sum::<u64>() != BPS_ONE {
            return invalid("settlement.top_split_bps must sum to 10000");
        }
        if settlement.floor_multipliers_bps.windows(2).any(|w| w[0] < w[1]) {
            return invalid("settlement.floor_multipliers_bps must not increase by rank");
        }
        if settlement.creator_cap_min_bps > settlement.creator_cap_max_bps {
            return invalid("settlement.creator_cap_min_bps exceeds creator_cap_max_bps");
        }
        if settlement.refund_moderator_min_bps > BPS_ONE || settlement.refund_moderator_max_bps > BPS_ONE {
            return invalid("settlement refund moderator shares must not exceed 10000 bps");
        }
        if settlement.tolerance.is_negative() {
            return invalid("settlement.tolerance must not be negative");
        }

        Ok(())
    }
}

fn invalid(message: &str) -> Result<()> {
    Err(VerdictError::Config(message.to_string()))
}

fn config_error(err: config::ConfigError) -> VerdictError {
    VerdictError::Config(err.to_string())
}
