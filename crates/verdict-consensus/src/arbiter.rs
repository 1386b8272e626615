//! # Super-Arbiter Blending
//!
//! A single privileged participant may weigh in on an item after the community.
//! Their score is blended with the community score; their decision replaces the
//! community decision outright.
//!
//! | Output         | Rule                                               |
//! |----------------|----------------------------------------------------|
//! | final score    | `0.49 × community + 0.51 × arbiter`, 2 decimals    |
//! | final decision | arbiter decision, regardless of the blended score  |
//!
//! Without an arbiter input both pass through from the community unchanged.

use serde::{Deserialize, Serialize};
use verdict_core::{Decision, ParticipantId, Result, Score, VerdictError, BPS_ONE};

use crate::evaluator::{ConsensusResult, ConsensusStatus};

/// Blend weights
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbiterConfig {
    /// Community share of the blended score (basis points)
    #[serde(default = "default_community_weight_bps")]
    pub community_weight_bps: u64,

    /// Arbiter share of the blended score (basis points)
    #[serde(default = "default_arbiter_weight_bps")]
    pub arbiter_weight_bps: u64,
}

fn default_community_weight_bps() -> u64 {
    4_900
}

fn default_arbiter_weight_bps() -> u64 {
    5_100
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            community_weight_bps: default_community_weight_bps(),
            arbiter_weight_bps: default_arbiter_weight_bps(),
        }
    }
}

impl ArbiterConfig {
    pub fn weights_balanced(&self) -> bool {
        self.community_weight_bps + self.arbiter_weight_bps == BPS_ONE
    }
}

/// When a campaign routes items to the super-arbiter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbiterMode {
    /// Only escalated items
    #[default]
    OnEscalation,
    /// Every item gets a privileged second pass
    Always,
}

/// Whether an item in `status` is routed to the arbiter under `mode`
pub fn requires_arbiter(status: ConsensusStatus, mode: ArbiterMode) -> bool {
    match mode {
        ArbiterMode::OnEscalation => status == ConsensusStatus::Escalated,
        ArbiterMode::Always => true,
    }
}

/// Community side of a blend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityVerdict {
    pub score: Score,
    pub decision: Decision,
}

impl CommunityVerdict {
    pub fn new(score: Score, decision: Decision) -> Self {
        Self { score, decision }
    }

    /// Community verdict from an evaluation.
    ///
    /// Terminal statuses carry their own decision. Otherwise the heavier side
    /// wins, and a tie or an empty tally counts as a rejection.
    pub fn from_result(result: &ConsensusResult) -> Self {
        let decision = result
            .status
            .decision()
            .or(result.breakdown.dominant)
            .unwrap_or(Decision::Reject);
        Self {
            score: result.community_score,
            decision,
        }
    }
}

/// Judgment of the super-arbiter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbiterInput {
    pub arbiter_id: ParticipantId,
    pub score: Score,
    pub decision: Decision,
}

impl ArbiterInput {
    pub fn new(arbiter_id: ParticipantId, score: Score, decision: Decision) -> Self {
        Self {
            arbiter_id,
            score,
            decision,
        }
    }
}

/// Outcome of blending
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalDecision {
    pub final_score: Score,
    pub final_decision: Decision,
    pub community: CommunityVerdict,
    pub arbiter: Option<ArbiterInput>,
    /// The arbiter decision differs from the community decision
    pub overridden: bool,
}

/// Super-arbiter blender
#[derive(Clone, Debug, Default)]
pub struct SuperArbiterBlender {
    config: ArbiterConfig,
}

impl SuperArbiterBlender {
    pub fn new(config: ArbiterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    /// Blend a community verdict with an optional arbiter judgment
    pub fn blend(&self, community: CommunityVerdict, arbiter: Option<ArbiterInput>) -> FinalDecision {
        let Some(input) = arbiter else {
            return FinalDecision {
                final_score: community.score,
                final_decision: community.decision,
                community,
                arbiter: None,
                overridden: false,
            };
        };

        let final_score = Score::blend(
            community.score,
            self.config.community_weight_bps,
            input.score,
            self.config.arbiter_weight_bps,
        );
        let overridden = input.decision != community.decision;

        if overridden {
            tracing::info!(
                "Arbiter {} overrode community decision {} with {} (score {})",
                input.arbiter_id,
                community.decision,
                input.decision,
                final_score
            );
        }

        FinalDecision {
            final_score,
            final_decision: input.decision,
            community,
            arbiter: Some(input),
            overridden,
        }
    }

    /// Blend an evaluation result, refusing arbiter input the mode does not call for
    pub fn blend_result(
        &self,
        result: &ConsensusResult,
        arbiter: Option<ArbiterInput>,
        mode: ArbiterMode,
    ) -> Result<FinalDecision> {
        if arbiter.is_some() && !requires_arbiter(result.status, mode) {
            return Err(VerdictError::ArbiterNotPermitted {
                status: result.status.to_string(),
            });
        }
        Ok(self.blend(CommunityVerdict::from_result(result), arbiter))
    }
}
