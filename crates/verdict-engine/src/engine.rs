//! # Moderation Engine
//!
//! The four calls a host makes, behind one configured value.
//!
//! | Call               | When                              | Returns              |
//! |--------------------|-----------------------------------|----------------------|
//! | `derive_economics` | campaign creation                 | `CampaignEconomics`  |
//! | `evaluate`         | after every vote write            | `ConsensusResult`    |
//! | `blend`            | escalated or arbiter-mandated     | `FinalDecision`      |
//! | `settle`           | campaign finalisation, once       | `SettlementPlan`     |
//!
//! The engine holds configuration only. Votes, tallies, and settlement
//! markers are supplied by the caller on every call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use verdict_consensus::{
    requires_arbiter, AggregatedTally, ArbiterInput, ArbiterMode, AutoResolvePolicy,
    ConsensusEvaluator, ConsensusResult, FinalDecision, SuperArbiterBlender, VoteBook,
    WeightCalculator,
};
use std::collections::BTreeMap;
use verdict_core::{Amount, CampaignId, ParticipantId, Result, VerdictError, Weight};
use verdict_economics::{
    project_settlements, split_moderator_pool, CampaignEconomics, EconomicsModel,
    ModeratorPayout, ModeratorStake, ProjectedSettlement, SettlementCalculator, SettlementPlan,
    TopCompletion,
};

use crate::config::EngineConfig;
use crate::registry::SettlementRegistry;

/// Per-campaign choices fixed at creation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignPolicy {
    pub auto_resolve: AutoResolvePolicy,
    #[serde(default)]
    pub arbiter_mode: ArbiterMode,
}

impl CampaignPolicy {
    pub fn new(auto_resolve: AutoResolvePolicy) -> Self {
        Self {
            auto_resolve,
            arbiter_mode: ArbiterMode::default(),
        }
    }

    pub fn with_arbiter_mode(mut self, arbiter_mode: ArbiterMode) -> Self {
        self.arbiter_mode = arbiter_mode;
        self
    }
}

/// Outcome of [`ModerationEngine::decide`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDecision {
    pub result: ConsensusResult,
    /// Present once an arbiter judgment has been blended in
    pub final_decision: Option<FinalDecision>,
    /// The campaign's arbiter mode requires a judgment that was not supplied
    pub awaiting_arbiter: bool,
}

/// A settlement that was recorded in a registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledCampaign {
    pub campaign_id: CampaignId,
    pub fingerprint: String,
    pub plan: SettlementPlan,
}

/// Moderation consensus and settlement engine
#[derive(Clone, Debug)]
pub struct ModerationEngine {
    config: EngineConfig,
    weights: WeightCalculator,
    evaluator: ConsensusEvaluator,
    blender: SuperArbiterBlender,
    economics: EconomicsModel,
    settlement: SettlementCalculator,
}

impl Default for ModerationEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl ModerationEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            weights: WeightCalculator::new(config.weights.clone()),
            evaluator: ConsensusEvaluator::new(config.consensus.clone()),
            blender: SuperArbiterBlender::new(config.arbiter.clone()),
            economics: EconomicsModel::new(config.economics.clone()),
            settlement: SettlementCalculator::new(config.settlement.clone()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn weight_calculator(&self) -> &WeightCalculator {
        &self.weights
    }

    pub fn settlement_calculator(&self) -> &SettlementCalculator {
        &self.settlement
    }

    /// DeriveEconomics: price a new campaign
    pub fn derive_economics(&self, unit_price: Amount, max_completions: i64) -> Result<CampaignEconomics> {
        self.economics.derive(unit_price, max_completions)
    }

    /// Rebuild the tally of a vote book with the configured weights
    pub fn tally(&self, book: &VoteBook) -> AggregatedTally {
        book.tally(&self.weights)
    }

    /// Evaluate: decide an item from its tally
    pub fn evaluate(
        &self,
        tally: &AggregatedTally,
        economics: &CampaignEconomics,
        now: DateTime<Utc>,
        window_end: DateTime<Utc>,
        policy: AutoResolvePolicy,
    ) -> ConsensusResult {
        self.evaluator
            .evaluate(tally, economics.unit_price, now, window_end, policy)
    }

    /// Tally a vote book and evaluate it
    pub fn evaluate_book(
        &self,
        book: &VoteBook,
        economics: &CampaignEconomics,
        now: DateTime<Utc>,
        window_end: DateTime<Utc>,
        policy: AutoResolvePolicy,
    ) -> ConsensusResult {
        let tally = self.tally(book);
        let result = self.evaluate(&tally, economics, now, window_end, policy);
        tracing::debug!(
            "Evaluated {} ({} votes): {}",
            book.content_id(),
            book.len(),
            result.status
        );
        result
    }

    /// Blend: apply the super-arbiter to an evaluation
    pub fn blend(
        &self,
        result: &ConsensusResult,
        arbiter: Option<ArbiterInput>,
        mode: ArbiterMode,
    ) -> Result<FinalDecision> {
        self.blender.blend_result(result, arbiter, mode)
    }

    /// Evaluate a vote book under a campaign's policy and blend the arbiter
    /// judgment when one is supplied.
    pub fn decide(
        &self,
        book: &VoteBook,
        economics: &CampaignEconomics,
        now: DateTime<Utc>,
        window_end: DateTime<Utc>,
        policy: &CampaignPolicy,
        arbiter: Option<ArbiterInput>,
    ) -> Result<ItemDecision> {
        let result = self.evaluate_book(book, economics, now, window_end, policy.auto_resolve);
        let final_decision = match arbiter {
            Some(input) => Some(self.blend(&result, Some(input), policy.arbiter_mode)?),
            None => None,
        };
        let awaiting_arbiter =
            final_decision.is_none() && requires_arbiter(result.status, policy.arbiter_mode);

        Ok(ItemDecision {
            result,
            final_decision,
            awaiting_arbiter,
        })
    }

    /// Settle: compute the payout plan of a finalised campaign
    pub fn settle(
        &self,
        economics: &CampaignEconomics,
        completion_count: u64,
        top_completions: &[TopCompletion],
    ) -> Result<SettlementPlan> {
        self.settlement
            .settle(economics, completion_count, top_completions)
    }

    /// Settle a campaign unless the registry already records it
    pub fn settle_once(
        &self,
        registry: &dyn SettlementRegistry,
        campaign_id: &CampaignId,
        economics: &CampaignEconomics,
        completion_count: u64,
        top_completions: &[TopCompletion],
    ) -> Result<SettledCampaign> {
        if registry.is_settled(campaign_id) {
            tracing::warn!("Refusing to settle {} twice", campaign_id);
            return Err(VerdictError::AlreadySettled(campaign_id.clone()));
        }

        let plan = self.settle(economics, completion_count, top_completions)?;
        let fingerprint = plan.fingerprint(campaign_id);

        if !registry.mark_settled(campaign_id, &fingerprint) {
            tracing::warn!("Campaign {} was settled concurrently", campaign_id);
            return Err(VerdictError::AlreadySettled(campaign_id.clone()));
        }

        tracing::info!("Recorded settlement of {} ({})", campaign_id, fingerprint);

        Ok(SettledCampaign {
            campaign_id: campaign_id.clone(),
            fingerprint,
            plan,
        })
    }

    /// Sum each voter's combined weight across a campaign's vote books
    pub fn moderator_stakes<'a>(&self, books: impl IntoIterator<Item = &'a VoteBook>) -> Vec<ModeratorStake> {
        let mut totals: BTreeMap<String, Weight> = BTreeMap::new();
        for book in books {
            for vote in book.votes() {
                *totals.entry(vote.voter_id.as_str().to_string()).or_default() +=
                    self.weights.weigh(vote).combined;
            }
        }
        totals
            .into_iter()
            .map(|(moderator, weight)| ModeratorStake {
                moderator: ParticipantId::new(moderator),
                weight,
            })
            .collect()
    }

    /// Split a plan's moderator line across the campaign's moderators
    pub fn moderator_payouts(
        &self,
        plan: &SettlementPlan,
        stakes: &[ModeratorStake],
    ) -> Result<Vec<ModeratorPayout>> {
        let payouts = split_moderator_pool(plan.moderators, stakes)?;
        tracing::debug!(
            "Split moderator pool {} across {} moderators",
            plan.moderators,
            payouts.len()
        );
        Ok(payouts)
    }

    /// Creator-facing settlement quotes across completion counts
    pub fn project(&self, economics: &CampaignEconomics, step: u64) -> Result<Vec<ProjectedSettlement>> {
        project_settlements(&self.settlement, economics, step)
    }
}
