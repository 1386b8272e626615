//! # Settlement Calculator
//!
//! Splits a campaign's pool (`P × CR + mint`) once, at finalisation.
//!
//! ## Proportional Branch (`CR >= 5`)
//!
//! 1. Provisional shares from the completion-ratio curves
//! 2. Top-3 pool split 50/30/20 by rank; an empty rank's share goes to the platform
//! 3. Creator payout capped at `mint × cap(ratio)`, cap moving 1.2× → 3.0×
//! 4. Rank floors of 1.5P / 1.2P / 1.0P, funded in order from the capped
//!    surplus, the creator's surplus above the mint, then platform and
//!    moderators pro rata. Never from another rank.
//! 5. Capped surplus left over goes to the platform
//!
//! ## Refund Branch (`CR < 5`)
//!
//! Every completer gets `P` back. The creator loses the mint, which is split
//! between moderators (20% → 50% as `CR` approaches 5) and the platform.
//!
//! ## Conservation
//!
//! ```text
//! creator_payout + funded top slots + platform + moderators + completion_refunds == pool
//! ```
//!
//! Lines are rounded to cents. If rounding moves the sum by more than the
//! tolerance, the top slots, platform, and moderator lines are rescaled
//! proportionally. Any last residual lands on the platform.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use verdict_core::{Amount, CampaignId, ContentId, ParticipantId, Result, Score, VerdictError, BPS_ONE};

use crate::campaign::CampaignEconomics;
use crate::constants::{MAX_COMPLETIONS, MAX_UNIT_PRICE, MIN_ENGAGEMENT, TOP_SLOTS};
use crate::shares::{interpolate_bps, ProvisionalShares, ShareCurves};

/// Settlement parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Completions needed for the proportional split
    #[serde(default = "default_min_engagement")]
    pub min_engagement: u64,

    #[serde(default)]
    pub shares: ShareCurves,

    /// Top-3 pool split by rank (basis points)
    #[serde(default = "default_top_split_bps")]
    pub top_split_bps: [u64; TOP_SLOTS],

    /// Rank floors as multiples of `P` (basis points)
    #[serde(default = "default_floor_multipliers_bps")]
    pub floor_multipliers_bps: [u64; TOP_SLOTS],

    /// Creator cap on the mint at completion ratio 0 (basis points)
    #[serde(default = "default_creator_cap_min_bps")]
    pub creator_cap_min_bps: u64,

    /// Creator cap on the mint at completion ratio 1 (basis points)
    #[serde(default = "default_creator_cap_max_bps")]
    pub creator_cap_max_bps: u64,

    /// Moderator share of the mint in the refund branch at `CR = 0`
    #[serde(default = "default_refund_moderator_min_bps")]
    pub refund_moderator_min_bps: u64,

    /// Moderator share of the mint in the refund branch as `CR` reaches `min_engagement`
    #[serde(default = "default_refund_moderator_max_bps")]
    pub refund_moderator_max_bps: u64,

    /// Largest rounding drift absorbed without rescaling
    #[serde(default = "default_tolerance")]
    pub tolerance: Amount,
}

fn default_min_engagement() -> u64 {
    MIN_ENGAGEMENT
}

fn default_top_split_bps() -> [u64; TOP_SLOTS] {
    [5_000, 3_000, 2_000]
}

fn default_floor_multipliers_bps() -> [u64; TOP_SLOTS] {
    [15_000, 12_000, 10_000]
}

fn default_creator_cap_min_bps() -> u64 {
    12_000
}

fn default_creator_cap_max_bps() -> u64 {
    30_000
}

fn default_refund_moderator_min_bps() -> u64 {
    2_000
}

fn default_refund_moderator_max_bps() -> u64 {
    5_000
}

fn default_tolerance() -> Amount {
    Amount::from_cents(1)
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            min_engagement: default_min_engagement(),
            shares: ShareCurves::default(),
            top_split_bps: default_top_split_bps(),
            floor_multipliers_bps: default_floor_multipliers_bps(),
            creator_cap_min_bps: default_creator_cap_min_bps(),
            creator_cap_max_bps: default_creator_cap_max_bps(),
            refund_moderator_min_bps: default_refund_moderator_min_bps(),
            refund_moderator_max_bps: default_refund_moderator_max_bps(),
            tolerance: default_tolerance(),
        }
    }
}

/// A ranked, validated completion eligible for a top slot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopCompletion {
    pub completion_id: ContentId,
    pub recipient: ParticipantId,
    pub score: Score,
}

/// Which split was applied
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementBranch {
    Proportional,
    Refund,
}

impl SettlementBranch {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Proportional => "proportional",
            Self::Refund => "refund",
        }
    }
}

impl fmt::Display for SettlementBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One ranked payout line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSlot {
    /// 1-based rank
    pub rank: u8,
    pub completion_id: Option<ContentId>,
    pub recipient: Option<ParticipantId>,
    pub amount: Amount,
    /// Guaranteed minimum for a filled slot
    pub floor: Amount,
    /// Refund entitlement, paid through `completion_refunds`
    pub is_refund_tier: bool,
    /// The floor could not be met in full
    pub floor_shortfall: bool,
}

impl TopSlot {
    fn empty(rank: u8) -> Self {
        Self {
            rank,
            completion_id: None,
            recipient: None,
            amount: Amount::ZERO,
            floor: Amount::ZERO,
            is_refund_tier: false,
            floor_shortfall: false,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.recipient.is_some()
    }

    /// Amount this line draws from the pool on its own
    pub fn funded_amount(&self) -> Amount {
        if self.is_refund_tier {
            Amount::ZERO
        } else {
            self.amount
        }
    }
}

/// Payout plan for one campaign
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    pub branch: SettlementBranch,

    pub unit_price: Amount,
    pub completion_count: u64,
    pub max_completions: u64,
    pub completion_ratio_bps: u64,

    pub mint_amount: Amount,

    /// `P × CR + mint`
    pub total_pool: Amount,

    /// Provisional shares, absent in the refund branch
    pub shares: Option<ProvisionalShares>,

    /// Ceiling applied to the creator payout
    pub creator_cap: Amount,

    /// Gross amount paid to the creator
    pub creator_payout: Amount,

    /// `creator_payout - mint_amount`
    pub creator_net_gain: Amount,

    pub top_slots: Vec<TopSlot>,

    pub platform: Amount,
    pub moderators: Amount,

    /// `P × CR` returned to completers in the refund branch
    pub completion_refunds: Amount,

    /// Rounding drift exceeded the tolerance and lines were rescaled
    pub rescaled: bool,
}

impl SettlementPlan {
    /// Sum of every funded line
    pub fn distributed_total(&self) -> Amount {
        self.creator_payout
            + self.top_slots.iter().map(TopSlot::funded_amount).sum::<Amount>()
            + self.platform
            + self.moderators
            + self.completion_refunds
    }

    /// `total_pool - distributed_total()`
    pub fn conservation_error(&self) -> Amount {
        self.total_pool - self.distributed_total()
    }

    pub fn slot(&self, rank: u8) -> Option<&TopSlot> {
        self.top_slots.iter().find(|s| s.rank == rank)
    }

    pub fn is_refund(&self) -> bool {
        self.branch == SettlementBranch::Refund
    }

    /// BLAKE3 digest of the campaign id and every plan line, hex encoded
    pub fn fingerprint(&self, campaign_id: &CampaignId) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"verdict.settlement.v1");

        let id = campaign_id.as_str().as_bytes();
        hasher.update(&(id.len() as u64).to_le_bytes());
        hasher.update(id);

        hasher.update(self.branch.name().as_bytes());
        hasher.update(&self.completion_count.to_le_bytes());
        for amount in [
            self.total_pool,
            self.mint_amount,
            self.creator_payout,
            self.platform,
            self.moderators,
            self.completion_refunds,
        ] {
            hasher.update(&amount.micros().to_le_bytes());
        }

        for slot in &self.top_slots {
            hasher.update(&[slot.rank, slot.is_refund_tier as u8]);
            let recipient = slot.recipient.as_ref().map(|r| r.as_str()).unwrap_or("");
            hasher.update(&(recipient.len() as u64).to_le_bytes());
            hasher.update(recipient.as_bytes());
            hasher.update(&slot.amount.micros().to_le_bytes());
        }

        hex::encode(hasher.finalize().as_bytes())
    }
}

/// Settlement calculator
#[derive(Clone, Debug, Default)]
pub struct SettlementCalculator {
    config: SettlementConfig,
}

impl SettlementCalculator {
    pub fn new(config: SettlementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Compute the payout plan for a finalised campaign.
    ///
    /// `top_completions` must hold at most three validated completions, at
    /// most `completion_count` of them, ordered by non-increasing score.
    pub fn settle(
        &self,
        economics: &CampaignEconomics,
        completion_count: u64,
        top_completions: &[TopCompletion],
    ) -> Result<SettlementPlan> {
        Self::validate(economics, completion_count, top_completions)?;

        let plan = if completion_count < self.config.min_engagement {
            self.settle_refund(economics, completion_count, top_completions)
        } else {
            self.settle_proportional(economics, completion_count, top_completions)
        };

        tracing::info!(
            "Settled campaign pool: branch={} completions={}/{} pool={} creator={} (net {}) platform={} moderators={} refunds={}",
            plan.branch,
            plan.completion_count,
            plan.max_completions,
            plan.total_pool,
            plan.creator_payout,
            plan.creator_net_gain,
            plan.platform,
            plan.moderators,
            plan.completion_refunds
        );

        Ok(plan)
    }

    fn validate(
        economics: &CampaignEconomics,
        completion_count: u64,
        top_completions: &[TopCompletion],
    ) -> Result<()> {
        if !economics.unit_price.is_positive() || economics.mint_amount.is_negative() {
            return Err(VerdictError::InvalidSettlementInput {
                field: "economics",
                reason: format!(
                    "unit price {} and mint {} must be positive",
                    economics.unit_price, economics.mint_amount
                ),
            });
        }
        if economics.unit_price > MAX_UNIT_PRICE {
            return Err(VerdictError::InvalidSettlementInput {
                field: "unit_price",
                reason: format!(
                    "unit price {} exceeds the maximum of {}",
                    economics.unit_price, MAX_UNIT_PRICE
                ),
            });
        }
        if economics.max_completions > MAX_COMPLETIONS {
            return Err(VerdictError::InvalidSettlementInput {
                field: "max_completions",
                reason: format!(
                    "budget of {} exceeds the maximum of {}",
                    economics.max_completions, MAX_COMPLETIONS
                ),
            });
        }
        // no derivable fee reaches the largest campaign's gross value
        let max_mint = MAX_UNIT_PRICE.times(MAX_COMPLETIONS);
        if economics.mint_amount > max_mint {
            return Err(VerdictError::InvalidSettlementInput {
                field: "mint_amount",
                reason: format!(
                    "mint {} exceeds the maximum of {}",
                    economics.mint_amount, max_mint
                ),
            });
        }
        if completion_count > economics.max_completions {
            return Err(VerdictError::InvalidSettlementInput {
                field: "completion_count",
                reason: format!(
                    "{} completions exceed the budget of {}",
                    completion_count, economics.max_completions
                ),
            });
        }
        if top_completions.len() > TOP_SLOTS {
            return Err(VerdictError::InvalidSettlementInput {
                field: "top_completions",
                reason: format!("{} supplied, at most {}", top_completions.len(), TOP_SLOTS),
            });
        }
        if top_completions.len() as u64 > completion_count {
            return Err(VerdictError::InvalidSettlementInput {
                field: "top_completions",
                reason: format!(
                    "{} supplied for {} completions",
                    top_completions.len(),
                    completion_count
                ),
            });
        }
        if top_completions.windows(2).any(|w| w[0].score < w[1].score) {
            return Err(VerdictError::InvalidSettlementInput {
                field: "top_completions",
                reason: "not ordered by non-increasing score".to_string(),
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = top_completions.iter().find(|t| !seen.insert(&t.completion_id)) {
            return Err(VerdictError::InvalidSettlementInput {
                field: "top_completions",
                reason: format!("duplicate completion {}", dup.completion_id),
            });
        }
        Ok(())
    }

    fn settle_refund(
        &self,
        economics: &CampaignEconomics,
        completion_count: u64,
        top_completions: &[TopCompletion],
    ) -> SettlementPlan {
        let unit_price = economics.unit_price;
        let mint = economics.mint_amount;

        let progress_bps = completion_count * BPS_ONE / self.config.min_engagement.max(1);
        let moderator_bps = interpolate_bps(
            self.config.refund_moderator_min_bps,
            self.config.refund_moderator_max_bps,
            progress_bps,
        );
        let moderators = mint.mul_bps(moderator_bps).round_cents().min(mint);
        let platform = mint - moderators;

        let top_slots = (0..TOP_SLOTS)
            .map(|index| {
                let top = top_completions.get(index);
                TopSlot {
                    rank: index as u8 + 1,
                    completion_id: top.map(|t| t.completion_id.clone()),
                    recipient: top.map(|t| t.recipient.clone()),
                    amount: unit_price,
                    floor: unit_price,
                    is_refund_tier: true,
                    floor_shortfall: false,
                }
            })
            .collect();

        SettlementPlan {
            branch: SettlementBranch::Refund,
            unit_price,
            completion_count,
            max_completions: economics.max_completions,
            completion_ratio_bps: economics.completion_ratio_bps(completion_count),
            mint_amount: mint,
            total_pool: economics.pool_value(completion_count),
            shares: None,
            creator_cap: Amount::ZERO,
            creator_payout: Amount::ZERO,
            creator_net_gain: -mint,
            top_slots,
            platform,
            moderators,
            completion_refunds: unit_price.times(completion_count),
            rescaled: false,
        }
    }

    fn settle_proportional(
        &self,
        economics: &CampaignEconomics,
        completion_count: u64,
        top_completions: &[TopCompletion],
    ) -> SettlementPlan {
        let unit_price = economics.unit_price;
        let mint = economics.mint_amount;
        let total = economics.pool_value(completion_count);
        let ratio_bps = economics.completion_ratio_bps(completion_count);
        let shares = self.config.shares.at(ratio_bps);

        let top3_pool = total.mul_bps(shares.top3_bps);
        let creator_raw = total.mul_bps(shares.creator_bps);
        let mut moderators = total.mul_bps(shares.moderators_bps);
        let mut platform = total - top3_pool - creator_raw - moderators;

        // rank split; unfilled ranks fall to the platform
        let mut top_slots = Vec::with_capacity(TOP_SLOTS);
        let mut allotted = Amount::ZERO;
        for index in 0..TOP_SLOTS {
            let share = top3_pool.mul_bps(self.config.top_split_bps[index]);
            allotted += share;
            let rank = index as u8 + 1;
            match top_completions.get(index) {
                Some(top) => top_slots.push(TopSlot {
                    rank,
                    completion_id: Some(top.completion_id.clone()),
                    recipient: Some(top.recipient.clone()),
                    amount: share,
                    floor: unit_price.mul_bps(self.config.floor_multipliers_bps[index]),
                    is_refund_tier: false,
                    floor_shortfall: false,
                }),
                None => {
                    platform += share;
                    top_slots.push(TopSlot::empty(rank));
                }
            }
        }
        platform += top3_pool - allotted;

        // creator cap
        let cap_bps = interpolate_bps(
            self.config.creator_cap_min_bps,
            self.config.creator_cap_max_bps,
            ratio_bps,
        );
        let creator_cap = mint.mul_bps(cap_bps);
        let mut creator = creator_raw.min(creator_cap);
        let mut capped_surplus = creator_raw - creator;

        // floors
        for slot in top_slots.iter_mut().filter(|s| s.is_filled()) {
            let mut need = (slot.floor - slot.amount).clamp_non_negative();
            if need.is_zero() {
                continue;
            }

            let take = need.min(capped_surplus);
            capped_surplus -= take;
            slot.amount += take;
            need -= take;

            let creator_surplus = (creator - mint).clamp_non_negative();
            let take = need.min(creator_surplus);
            creator -= take;
            slot.amount += take;
            need -= take;

            let shared = platform + moderators;
            let take = need.min(shared);
            if take.is_positive() {
                let from_moderators = take
                    .mul_ratio(moderators.micros(), shared.micros())
                    .min(moderators);
                let from_platform = take - from_moderators;
                moderators -= from_moderators;
                platform -= from_platform;
                slot.amount += take;
                need -= take;
            }

            if need.is_positive() {
                slot.floor_shortfall = true;
                tracing::warn!(
                    "Top slot {} floor {} short by {} after exhausting every funding source",
                    slot.rank,
                    slot.floor,
                    need
                );
            }
        }
        platform += capped_surplus;

        let mut plan = SettlementPlan {
            branch: SettlementBranch::Proportional,
            unit_price,
            completion_count,
            max_completions: economics.max_completions,
            completion_ratio_bps: ratio_bps,
            mint_amount: mint,
            total_pool: total,
            shares: Some(shares),
            creator_cap,
            creator_payout: creator.round_cents(),
            creator_net_gain: Amount::ZERO,
            top_slots,
            platform: platform.round_cents(),
            moderators: moderators.round_cents(),
            completion_refunds: Amount::ZERO,
            rescaled: false,
        };
        for slot in plan.top_slots.iter_mut() {
            slot.amount = slot.amount.round_cents();
        }

        self.close_conservation(&mut plan);
        plan.creator_net_gain = plan.creator_payout - mint;
        plan
    }

    /// Make the funded lines sum to the pool exactly
    fn close_conservation(&self, plan: &mut SettlementPlan) {
        let drift = plan.conservation_error();
        if drift.abs() > self.config.tolerance {
            let target = plan.total_pool - plan.creator_payout - plan.completion_refunds;
            let current = plan.distributed_total() - plan.creator_payout - plan.completion_refunds;
            if current.is_positive() {
                tracing::warn!(
                    "Settlement drift {} exceeds tolerance {}, rescaling {} to {}",
                    drift,
                    self.config.tolerance,
                    current,
                    target
                );
                let (num, den) = (target.micros(), current.micros());
                for slot in plan.top_slots.iter_mut().filter(|s| !s.is_refund_tier) {
                    slot.amount = slot.amount.mul_ratio(num, den).round_cents();
                }
                plan.platform = plan.platform.mul_ratio(num, den).round_cents();
                plan.moderators = plan.moderators.mul_ratio(num, den).round_cents();
                plan.rescaled = true;
            }
        }

        Self::restore_floors(plan);

        // platform absorbs the residual unless that would drive it negative
        let residual = plan.conservation_error();
        if (plan.platform + residual).is_negative() {
            plan.moderators += residual;
        } else {
            plan.platform += residual;
        }
    }

    /// Lift funded slots that cent rounding or rescaling left under their
    /// cent-rounded floor, drawing from the platform and then the moderators.
    fn restore_floors(plan: &mut SettlementPlan) {
        for slot in plan
            .top_slots
            .iter_mut()
            .filter(|s| s.is_filled() && !s.is_refund_tier && !s.floor_shortfall)
        {
            let mut need = (slot.floor.round_cents() - slot.amount).clamp_non_negative();
            if need.is_zero() {
                continue;
            }

            let take = need.min(plan.platform.clamp_non_negative());
            plan.platform -= take;
            slot.amount += take;
            need -= take;

            let take = need.min(plan.moderators.clamp_non_negative());
            plan.moderators -= take;
            slot.amount += take;
            need -= take;

            if need.is_positive() {
                slot.floor_shortfall = true;
                tracing::warn!(
                    "Top slot {} floor {} short by {} after rounding",
                    slot.rank,
                    slot.floor,
                    need
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::derive_economics;
    use proptest::prelude::*;

    fn economics(unit_price: i64, max_completions: i64) -> CampaignEconomics {
        derive_economics(Amount::from_units(unit_price), max_completions).unwrap()
    }

    fn tops(count: usize) -> Vec<TopCompletion> {
        (0..count)
            .map(|i| TopCompletion {
                completion_id: ContentId::new(format!("completion-{}", i + 1)),
                recipient: ParticipantId::new(format!("completer-{}", i + 1)),
                score: Score::from_hundredths(9_000 - i as u32 * 100).unwrap(),
            })
            .collect()
    }

    #[test]
    fn test_refund_branch_with_no_completions() {
        let econ = economics(10, 10);
        let plan = SettlementCalculator::default().settle(&econ, 0, &[]).unwrap();

        assert_eq!(plan.branch, SettlementBranch::Refund);
        assert_eq!(plan.top_slots.len(), 3);
        for slot in &plan.top_slots {
            assert_eq!(slot.amount, Amount::from_units(10));
            assert!(slot.is_refund_tier);
        }
        assert_eq!(plan.creator_payout, Amount::ZERO);
        assert_eq!(plan.creator_net_gain, -econ.mint_amount);
        assert_eq!(plan.platform + plan.moderators, econ.mint_amount);
        assert_eq!(plan.moderators, Amount::from_cents(204));
        assert_eq!(plan.completion_refunds, Amount::ZERO);
        assert_eq!(plan.conservation_error(), Amount::ZERO);
    }

    #[test]
    fn test_refund_moderator_share_grows_with_completions() {
        let econ = economics(10, 10);
        let calc = SettlementCalculator::default();
        let plan = calc.settle(&econ, 4, &tops(2)).unwrap();

        assert_eq!(plan.branch, SettlementBranch::Refund);
        assert_eq!(plan.completion_refunds, Amount::from_units(40));
        // 20% + 30% × 4/5 = 44% of 10.20
        assert_eq!(plan.moderators, Amount::from_cents(449));
        assert_eq!(plan.platform, Amount::from_cents(571));
        assert_eq!(plan.slot(1).unwrap().recipient, Some(ParticipantId::new("completer-1")));
        assert!(plan.slot(3).unwrap().recipient.is_none());
        assert_eq!(plan.conservation_error(), Amount::ZERO);

        let fewer = calc.settle(&econ, 1, &tops(1)).unwrap();
        assert!(fewer.moderators < plan.moderators);
    }

    #[test]
    fn test_full_completion_caps_creator() {
        let econ = economics(10, 10);
        let plan = SettlementCalculator::default()
            .settle(&econ, 10, &tops(3))
            .unwrap();

        assert_eq!(plan.branch, SettlementBranch::Proportional);
        assert_eq!(plan.total_pool, Amount::from_cents(11_020));
        // cap 3.0 × 10.20
        assert_eq!(plan.creator_cap, Amount::from_cents(3_060));
        assert_eq!(plan.creator_payout, Amount::from_cents(3_060));
        assert_eq!(plan.creator_net_gain, Amount::from_cents(2_040));

        assert_eq!(plan.slot(1).unwrap().amount, Amount::from_cents(2_204));
        assert_eq!(plan.slot(2).unwrap().amount, Amount::from_cents(1_322));
        // rank 3 lifted to its floor out of the capped surplus
        assert_eq!(plan.slot(3).unwrap().amount, Amount::from_units(10));
        assert!(plan.top_slots.iter().all(|s| !s.floor_shortfall));

        assert_eq!(plan.moderators, Amount::from_cents(882));
        assert_eq!(plan.platform, Amount::from_cents(2_552));
        assert_eq!(plan.conservation_error(), Amount::ZERO);
        assert!(!plan.rescaled);
    }

    #[test]
    fn test_floors_drain_creator_surplus_before_platform() {
        let econ = economics(10, 10);
        let plan = SettlementCalculator::default()
            .settle(&econ, 5, &tops(3))
            .unwrap();

        assert_eq!(plan.total_pool, Amount::from_cents(6_020));
        assert_eq!(plan.slot(1).unwrap().amount, Amount::from_units(15));
        assert_eq!(plan.slot(2).unwrap().amount, Amount::from_units(12));
        assert_eq!(plan.slot(3).unwrap().amount, Amount::from_units(10));

        // creator drained down to the mint, never below it
        assert_eq!(plan.creator_payout, econ.mint_amount);
        assert_eq!(plan.creator_net_gain, Amount::ZERO);
        assert_eq!(plan.platform + plan.moderators, Amount::from_units(13));
        assert_eq!(plan.conservation_error(), Amount::ZERO);
    }

    #[test]
    fn test_unfilled_ranks_go_to_platform() {
        let econ = economics(10, 10);
        let calc = SettlementCalculator::default();
        let one = calc.settle(&econ, 10, &tops(1)).unwrap();
        let three = calc.settle(&econ, 10, &tops(3)).unwrap();

        assert!(one.slot(2).unwrap().amount.is_zero());
        assert!(!one.slot(3).unwrap().is_filled());
        assert!(one.platform > three.platform);
        assert_eq!(one.creator_payout, three.creator_payout);
        assert_eq!(one.conservation_error(), Amount::ZERO);
    }

    #[test]
    fn test_unmet_floor_is_flagged() {
        let econ = economics(10, 10);
        let config = SettlementConfig {
            floor_multipliers_bps: [40_000, 30_000, 30_000],
            ..SettlementConfig::default()
        };
        let plan = SettlementCalculator::new(config).settle(&econ, 5, &tops(3)).unwrap();

        // rank 1 absorbs every funding source first and still falls short
        assert!(plan.top_slots.iter().all(|s| s.floor_shortfall));
        assert!(plan.slot(1).unwrap().amount > plan.slot(2).unwrap().amount);
        assert_eq!(plan.creator_payout, econ.mint_amount);
        assert_eq!(plan.platform, Amount::ZERO);
        assert_eq!(plan.moderators, Amount::ZERO);
        assert_eq!(plan.conservation_error(), Amount::ZERO);
    }

    #[test]
    fn test_rejects_inconsistent_input() {
        let econ = economics(10, 10);
        let calc = SettlementCalculator::default();

        let err = calc.settle(&econ, 11, &[]).unwrap_err();
        assert_eq!(err.field(), Some("completion_count"));

        let err = calc.settle(&econ, 2, &tops(3)).unwrap_err();
        assert_eq!(err.field(), Some("top_completions"));

        let mut four = tops(3);
        four.push(four[2].clone());
        assert!(calc.settle(&econ, 10, &four).is_err());

        let mut unsorted = tops(3);
        unsorted.swap(0, 2);
        assert!(calc.settle(&econ, 10, &unsorted).is_err());

        let mut duplicated = tops(2);
        duplicated[1].completion_id = duplicated[0].completion_id.clone();
        assert!(calc.settle(&econ, 10, &duplicated).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_economics() {
        let calc = SettlementCalculator::default();

        let mut expensive = economics(10, 10);
        expensive.unit_price = Amount::from_micros(i128::MAX / 4);
        let err = calc.settle(&expensive, 10, &tops(3)).unwrap_err();
        assert_eq!(err.field(), Some("unit_price"));

        let mut oversized = economics(10, 10);
        oversized.max_completions = MAX_COMPLETIONS + 1;
        let err = calc.settle(&oversized, 10, &tops(3)).unwrap_err();
        assert_eq!(err.field(), Some("max_completions"));

        let mut overminted = economics(10, 10);
        overminted.mint_amount = Amount::from_micros(i128::MAX / 2);
        let err = calc.settle(&overminted, 0, &[]).unwrap_err();
        assert_eq!(err.field(), Some("mint_amount"));

        let largest = derive_economics(MAX_UNIT_PRICE, MAX_COMPLETIONS as i64).unwrap();
        let plan = calc
            .settle(&largest, MAX_COMPLETIONS, &tops(3))
            .unwrap();
        assert_eq!(plan.conservation_error(), Amount::ZERO);
    }

    #[test]
    fn test_rounding_keeps_funded_slots_at_floor() {
        let econ = derive_economics(Amount::from_micros(7_445_922), 5).unwrap();
        let plan = SettlementCalculator::default()
            .settle(&econ, 5, &tops(3))
            .unwrap();

        assert_eq!(plan.branch, SettlementBranch::Proportional);
        for slot in &plan.top_slots {
            assert!(!slot.floor_shortfall);
            assert!(slot.amount >= slot.floor.round_cents());
        }
        assert!(plan.creator_payout >= econ.mint_amount.round_cents());
        assert_eq!(plan.conservation_error(), Amount::ZERO);
    }

    #[test]
    fn test_fingerprint() {
        let econ = economics(10, 10);
        let calc = SettlementCalculator::default();
        let plan = calc.settle(&econ, 10, &tops(3)).unwrap();
        let again = calc.settle(&econ, 10, &tops(3)).unwrap();
        let other = calc.settle(&econ, 9, &tops(3)).unwrap();

        let campaign = CampaignId::new("campaign-1");
        let digest = plan.fingerprint(&campaign);
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, again.fingerprint(&campaign));
        assert_ne!(digest, plan.fingerprint(&CampaignId::new("campaign-2")));
        assert_ne!(digest, other.fingerprint(&campaign));
    }

    proptest! {
        #[test]
        fn pool_is_conserved(
            price_cents in 1i64..500_000,
            max_completions in 1i64..400,
            completed in 0u64..400,
            top_count in 0usize..=3,
        ) {
            let econ = derive_economics(Amount::from_cents(price_cents), max_completions).unwrap();
            let completion_count = completed.min(max_completions as u64);
            let top_count = top_count.min(completion_count as usize);

            let plan = SettlementCalculator::default()
                .settle(&econ, completion_count, &tops(top_count))
                .unwrap();

            prop_assert_eq!(plan.conservation_error(), Amount::ZERO);
            prop_assert!(!plan.creator_payout.is_negative());
            prop_assert!(!plan.moderators.is_negative());
            prop_assert_eq!(plan.creator_net_gain, plan.creator_payout - econ.mint_amount);
            if plan.is_refund() {
                prop_assert_eq!(plan.platform + plan.moderators, econ.mint_amount);
            }
        }

        #[test]
        fn funded_slots_hold_their_floor(
            price_micros in 1_000_000i64..50_000_000,
            max_completions in 5i64..60,
            completed in 5u64..60,
        ) {
            let econ = derive_economics(Amount::from_micros(price_micros as i128), max_completions).unwrap();
            let completion_count = completed.min(max_completions as u64);

            let plan = SettlementCalculator::default()
                .settle(&econ, completion_count, &tops(3))
                .unwrap();

            prop_assert_eq!(plan.conservation_error(), Amount::ZERO);
            for slot in &plan.top_slots {
                prop_assert!(slot.floor_shortfall || slot.amount >= slot.floor.round_cents());
            }
        }
    }
}
