//! # Vote Weighting
//!
//! Turns one vote's raw inputs into its influence on the tally.
//!
//! | Component              | Formula                                   | Range      |
//! |------------------------|-------------------------------------------|------------|
//! | Plutocratic share      | `stake / (stake + K)`                     | `[0, 1)`   |
//! | Democratic multiplier  | `1 + ln(1 + xp) / ln(1 + XP_SCALE)`       | `[1, 2]`   |
//! | Age factor             | `min(1, age_days / AGE_MAX_DAYS)`         | `[0, 1]`   |
//!
//! Combined weight = plutocratic × multiplier × age. `K` is the democracy
//! threshold: a stake equal to `K` earns half of the maximum plutocratic share,
//! so large stakers see diminishing returns.

use serde::{Deserialize, Serialize};
use verdict_core::{Amount, Weight, BPS_ONE};

use crate::vote::Vote;

/// Weight calculator configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Stake at which the plutocratic share reaches one half
    #[serde(default = "default_democracy_threshold")]
    pub democracy_threshold: Amount,

    /// Experience at which the democratic multiplier reaches its ceiling
    #[serde(default = "default_xp_scale")]
    pub xp_scale: u64,

    /// Ceiling on the democratic multiplier (basis points)
    #[serde(default = "default_max_multiplier_bps")]
    pub max_democratic_multiplier_bps: u64,

    /// Stake age after which a stake counts in full
    #[serde(default = "default_age_max_days")]
    pub age_max_days: u32,
}

fn default_democracy_threshold() -> Amount {
    Amount::from_units(100)
}

fn default_xp_scale() -> u64 {
    10_000
}

fn default_max_multiplier_bps() -> u64 {
    20_000
}

fn default_age_max_days() -> u32 {
    30
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            democracy_threshold: default_democracy_threshold(),
            xp_scale: default_xp_scale(),
            max_democratic_multiplier_bps: default_max_multiplier_bps(),
            age_max_days: default_age_max_days(),
        }
    }
}

/// Weight contribution of one vote
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteWeight {
    /// Stake-proportional share, diminishing in stake
    pub plutocratic: Weight,

    /// Experience multiplier in `[1, ceiling]`
    pub democratic_multiplier: Weight,

    /// Stake maturity in `[0, 1]`
    pub age_factor: Weight,

    /// plutocratic × democratic_multiplier × age_factor
    pub combined: Weight,
}

impl VoteWeight {
    /// Per-capita component: experience multiplier discounted by stake age
    pub fn democratic(&self) -> Weight {
        self.democratic_multiplier.mul(self.age_factor)
    }
}

/// Weight calculator
#[derive(Clone, Debug, Default)]
pub struct WeightCalculator {
    config: WeightConfig,
}

impl WeightCalculator {
    pub fn new(config: WeightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WeightConfig {
        &self.config
    }

    /// Weigh a vote. Negative inputs count as zero.
    pub fn weigh(&self, vote: &Vote) -> VoteWeight {
        let plutocratic = self.plutocratic_share(vote.effective_stake());
        let democratic_multiplier = self.democratic_multiplier(vote.experience_score.max(0) as u64);
        let age_factor = self.age_factor(vote.stake_age_days.max(0) as u64);

        let combined = plutocratic.mul(democratic_multiplier).mul(age_factor);

        tracing::debug!(
            "Weighted vote from {}: plutocratic={} multiplier={} age={} combined={}",
            vote.voter_id,
            plutocratic,
            democratic_multiplier,
            age_factor,
            combined
        );

        VoteWeight {
            plutocratic,
            democratic_multiplier,
            age_factor,
            combined,
        }
    }

    /// `stake / (stake + K)`
    pub fn plutocratic_share(&self, stake: Amount) -> Weight {
        let stake = stake.clamp_non_negative().micros() as u128;
        let threshold = self.config.democracy_threshold.clamp_non_negative().micros() as u128;
        Weight::fraction(stake, stake + threshold)
    }

    /// `1 + ln(1 + xp) / ln(1 + XP_SCALE)`, capped at the configured ceiling
    pub fn democratic_multiplier(&self, experience: u64) -> Weight {
        let ceiling = Weight::ONE.mul_bps(self.config.max_democratic_multiplier_bps.max(BPS_ONE));
        if self.config.xp_scale == 0 {
            return Weight::ONE;
        }

        let bonus = (1.0 + experience as f64).ln() / (1.0 + self.config.xp_scale as f64).ln();
        Weight::from_f64(1.0 + bonus).min(ceiling)
    }

    /// `min(1, age_days / AGE_MAX_DAYS)`
    pub fn age_factor(&self, age_days: u64) -> Weight {
        let max_days = self.config.age_max_days as u64;
        if max_days == 0 {
            return Weight::ONE;
        }
        Weight::fraction(age_days.min(max_days) as u128, max_days as u128)
    }
}
