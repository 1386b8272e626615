//! Settlement projection for creator-facing quotes
//!
//! Runs the settlement calculator across a range of completion counts,
//! assuming every count fills as many top slots as it can.

use serde::{Deserialize, Serialize};
use verdict_core::{Amount, ContentId, ParticipantId, Result, Score, VerdictError};

use crate::campaign::CampaignEconomics;
use crate::constants::{MAX_PROJECTION_POINTS, TOP_SLOTS};
use crate::settlement::{SettlementBranch, SettlementCalculator, TopCompletion};

/// Headline figures of one projected settlement
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedSettlement {
    pub completion_count: u64,
    pub branch: SettlementBranch,
    pub total_pool: Amount,
    pub creator_payout: Amount,
    pub creator_net_gain: Amount,
    /// Top slot amounts by rank
    pub top_slots: Vec<Amount>,
    pub platform: Amount,
    pub moderators: Amount,
    pub completion_refunds: Amount,
}

/// Project settlements for `0, step, 2×step, …, N`.
///
/// The step is widened when needed so at most `MAX_PROJECTION_POINTS + 1`
/// points are produced. `N` itself is always included.
pub fn project_settlements(
    calculator: &SettlementCalculator,
    economics: &CampaignEconomics,
    step: u64,
) -> Result<Vec<ProjectedSettlement>> {
    if step == 0 {
        return Err(VerdictError::InvalidSettlementInput {
            field: "step",
            reason: "projection step must be positive".to_string(),
        });
    }

    let max = economics.max_completions;
    let step = step.max(max.div_ceil(MAX_PROJECTION_POINTS));
    let placeholders = placeholder_tops();

    let mut counts: Vec<u64> = (0..=max).step_by(step as usize).collect();
    if counts.last() != Some(&max) {
        counts.push(max);
    }

    counts
        .into_iter()
        .map(|count| {
            let filled = (count as usize).min(TOP_SLOTS);
            let plan = calculator.settle(economics, count, &placeholders[..filled])?;
            Ok(ProjectedSettlement {
                completion_count: count,
                branch: plan.branch,
                total_pool: plan.total_pool,
                creator_payout: plan.creator_payout,
                creator_net_gain: plan.creator_net_gain,
                top_slots: plan.top_slots.iter().map(|s| s.amount).collect(),
                platform: plan.platform,
                moderators: plan.moderators,
                completion_refunds: plan.completion_refunds,
            })
        })
        .collect()
}

fn placeholder_tops() -> Vec<TopCompletion> {
    (1..=TOP_SLOTS)
        .map(|rank| TopCompletion {
            completion_id: ContentId::new(format!("projected-{}", rank)),
            recipient: ParticipantId::new(format!("projected-completer-{}", rank)),
            score: Score::MAX,
        })
        .collect()
}
