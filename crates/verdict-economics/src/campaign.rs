//! # Campaign Economics
//!
//! Prices a campaign from its unit price `P` and completion budget `N`.
//!
//! ```text
//! duration = clamp(7, 30, round(7 + 7 × log10(max(1, P×N / 100))))
//! mint     = discount(duration) × (base + P×N × scaling + sqrt(P×N) × risk)
//! ```
//!
//! ## Duration Discount
//!
//! | Duration   | Multiplier |
//! |------------|------------|
//! | ≤ 7 days   | 0.85       |
//! | ≤ 14 days  | 0.90       |
//! | ≤ 21 days  | 0.95       |
//! | longer     | 1.00       |

use serde::{Deserialize, Serialize};
use verdict_core::{Amount, Result, VerdictError, BPS_ONE};

use crate::constants::*;

/// Discount applied to campaigns up to a given duration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTier {
    pub max_days: u32,
    pub multiplier_bps: u64,
}

impl DiscountTier {
    pub const fn new(max_days: u32, multiplier_bps: u64) -> Self {
        Self {
            max_days,
            multiplier_bps,
        }
    }
}

/// Fee formula parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomicsConfig {
    /// Flat component of the mint fee
    #[serde(default = "default_base_fee")]
    pub base_fee: Amount,

    /// Share of `P × N` charged (basis points)
    #[serde(default = "default_scaling_factor_bps")]
    pub scaling_factor_bps: u64,

    /// Coefficient on `sqrt(P × N)` (basis points)
    #[serde(default = "default_risk_adjustment_bps")]
    pub risk_adjustment_bps: u64,

    /// Discount tiers in increasing `max_days` order
    #[serde(default = "default_discount_tiers")]
    pub discount_tiers: Vec<DiscountTier>,
}

fn default_base_fee() -> Amount {
    Amount::from_units(5)
}

fn default_scaling_factor_bps() -> u64 {
    200
}

fn default_risk_adjustment_bps() -> u64 {
    5_000
}

fn default_discount_tiers() -> Vec<DiscountTier> {
    vec![
        DiscountTier::new(7, 8_500),
        DiscountTier::new(14, 9_000),
        DiscountTier::new(21, 9_500),
    ]
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            base_fee: default_base_fee(),
            scaling_factor_bps: default_scaling_factor_bps(),
            risk_adjustment_bps: default_risk_adjustment_bps(),
            discount_tiers: default_discount_tiers(),
        }
    }
}

impl EconomicsConfig {
    /// Discount multiplier for a duration; full fee past the last tier
    pub fn discount_for(&self, duration_days: u32) -> u64 {
        self.discount_tiers
            .iter()
            .find(|tier| duration_days <= tier.max_days)
            .map(|tier| tier.multiplier_bps)
            .unwrap_or(BPS_ONE)
    }
}

/// Fee components, kept for audit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub base_fee: Amount,
    pub scaling_fee: Amount,
    pub risk_fee: Amount,
    /// Sum of the three components before the discount
    pub subtotal: Amount,
    pub discount_bps: u64,
    /// `subtotal - mint_amount`
    pub discount_amount: Amount,
}

/// Immutable campaign metadata derived at creation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignEconomics {
    /// Fee each completer pays (`P`)
    pub unit_price: Amount,

    /// Completion budget (`N`)
    pub max_completions: u64,

    pub duration_days: u32,

    /// Duration discount (basis points)
    pub duration_discount_bps: u64,

    /// Upfront fee paid by the creator, rounded to cents
    pub mint_amount: Amount,

    pub fees: FeeBreakdown,
}

impl CampaignEconomics {
    /// `P × N`
    pub fn gross_value(&self) -> Amount {
        self.unit_price.times(self.max_completions)
    }

    /// `P × CR + mint`
    pub fn pool_value(&self, completion_count: u64) -> Amount {
        self.unit_price.times(completion_count) + self.mint_amount
    }

    /// `CR / N` in basis points, saturating at 1.0
    pub fn completion_ratio_bps(&self, completion_count: u64) -> u64 {
        if self.max_completions == 0 {
            return 0;
        }
        (completion_count.min(self.max_completions) * BPS_ONE) / self.max_completions
    }
}

/// Campaign economics model
#[derive(Clone, Debug, Default)]
pub struct EconomicsModel {
    config: EconomicsConfig,
}

impl EconomicsModel {
    pub fn new(config: EconomicsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EconomicsConfig {
        &self.config
    }

    /// Derive a campaign's duration and mint fee
    pub fn derive(&self, unit_price: Amount, max_completions: i64) -> Result<CampaignEconomics> {
        if !unit_price.is_positive() || unit_price > MAX_UNIT_PRICE {
            return Err(VerdictError::InvalidEconomicsInput {
                field: "unit_price",
                value: unit_price.to_string(),
            });
        }
        if max_completions <= 0 || max_completions as u64 > MAX_COMPLETIONS {
            return Err(VerdictError::InvalidEconomicsInput {
                field: "max_completions",
                value: max_completions.to_string(),
            });
        }
        let max_completions = max_completions as u64;

        let gross = unit_price.times(max_completions);
        let duration_days = Self::duration_days(gross);
        let discount_bps = self.config.discount_for(duration_days);

        let base_fee = self.config.base_fee;
        let scaling_fee = gross.mul_bps(self.config.scaling_factor_bps);
        let risk_fee = Amount::from_f64(gross.to_f64().sqrt()).mul_bps(self.config.risk_adjustment_bps);
        let subtotal = base_fee + scaling_fee + risk_fee;
        let mint_amount = subtotal.mul_bps(discount_bps).round_cents();

        tracing::info!(
            "Derived campaign economics: P={} N={} duration={}d discount={}bps mint={}",
            unit_price,
            max_completions,
            duration_days,
            discount_bps,
            mint_amount
        );

        Ok(CampaignEconomics {
            unit_price,
            max_completions,
            duration_days,
            duration_discount_bps: discount_bps,
            mint_amount,
            fees: FeeBreakdown {
                base_fee,
                scaling_fee,
                risk_fee,
                subtotal,
                discount_bps,
                discount_amount: subtotal - mint_amount,
            },
        })
    }

    /// `clamp(7, 30, round(7 + 7 × log10(max(1, gross / 100))))`
    pub fn duration_days(gross: Amount) -> u32 {
        let scaled = (gross.to_f64() / 100.0).max(1.0);
        let days = (7.0 + 7.0 * scaled.log10()).round();
        (days as u32).clamp(MIN_DURATION_DAYS, MAX_DURATION_DAYS)
    }
}

/// Derive campaign economics with the default fee formula
pub fn derive_economics(unit_price: Amount, max_completions: i64) -> Result<CampaignEconomics> {
    EconomicsModel::default().derive(unit_price, max_completions)
}
