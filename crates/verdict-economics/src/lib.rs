//! # Verdict Economics - Campaign Pricing & Reward Settlement
//!
//! Prices a campaign when it is created and splits its pooled value when it
//! is finalised.
//!
//! ## Campaign Lifecycle
//!
//! ```text
//!  create ──► derive_economics(P, N) ──► mint paid up front
//!                                            │
//!  completions pay P each, moderators judge  │
//!                                            ▼
//!  finalise ──► SettlementCalculator::settle(economics, CR, top3) ──► SettlementPlan
//! ```
//!
//! ## Settlement Branches
//!
//! | Branch       | Condition  | Outcome                                              |
//! |--------------|------------|------------------------------------------------------|
//! | Proportional | `CR >= 5`  | Pool split by completion-ratio curves, floors, cap   |
//! | Refund       | `CR < 5`   | Completers refunded `P`, mint split platform/mods    |
//!
//! Every currency figure is an [`Amount`](verdict_core::Amount) in integer
//! micro-units. Plan lines are rounded to cents and a closing step makes them
//! sum to the pool exactly.

pub mod campaign;
pub mod moderators;
pub mod projection;
pub mod ranking;
pub mod settlement;
pub mod shares;

// Re-exports
pub use campaign::{
    derive_economics, CampaignEconomics, DiscountTier, EconomicsConfig, EconomicsModel,
    FeeBreakdown,
};
pub use moderators::{split_moderator_pool, ModeratorPayout, ModeratorStake};
pub use projection::{project_settlements, ProjectedSettlement};
pub use ranking::{rank_top_completions, CompletionCandidate};
pub use settlement::{
    SettlementBranch, SettlementCalculator, SettlementConfig, SettlementPlan, TopCompletion, TopSlot,
};
pub use shares::{interpolate_bps, ProvisionalShares, ShareCurve, ShareCurves};

/// Economics constants
pub mod constants {
    use verdict_core::Amount;

    /// Highest accepted unit price
    pub const MAX_UNIT_PRICE: Amount = Amount::from_units(1_000_000);

    /// Highest accepted completion budget
    pub const MAX_COMPLETIONS: u64 = 1_000_000;

    /// Shortest campaign
    pub const MIN_DURATION_DAYS: u32 = 7;

    /// Longest campaign
    pub const MAX_DURATION_DAYS: u32 = 30;

    /// Completions needed before the proportional split applies
    pub const MIN_ENGAGEMENT: u64 = 5;

    /// Number of ranked top-completion slots
    pub const TOP_SLOTS: usize = 3;

    /// Largest number of points a settlement projection evaluates
    pub const MAX_PROJECTION_POINTS: u64 = 1_000;
}

pub use constants::*;

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::ONE_UNIT;

    #[test]
    fn test_bounds_fit_in_pool_arithmetic() {
        // largest pool times the largest basis-point factor stays inside i128
        let pool = MAX_UNIT_PRICE.micros() * MAX_COMPLETIONS as i128 * 2;
        assert!(pool.checked_mul(30_000).is_some());
        assert_eq!(MAX_UNIT_PRICE.micros(), 1_000_000 * ONE_UNIT);
    }

    #[test]
    fn test_duration_bounds() {
        assert!(MIN_DURATION_DAYS < MAX_DURATION_DAYS);
        assert_eq!(TOP_SLOTS, 3);
    }
}
