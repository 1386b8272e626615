//! Top-completion ranking
//!
//! Only accepted completions compete. Higher final score wins; equal scores
//! go to the earlier submission, then to the lower completion id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use verdict_core::{ContentId, Decision, ParticipantId, Score};

use crate::constants::TOP_SLOTS;
use crate::settlement::TopCompletion;

/// A completion with its final moderation outcome
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCandidate {
    pub completion_id: ContentId,
    pub recipient: ParticipantId,
    pub final_score: Score,
    pub final_decision: Decision,
    pub submitted_at: DateTime<Utc>,
}

/// Best accepted completions, at most three, ordered for settlement
pub fn rank_top_completions(candidates: &[CompletionCandidate]) -> Vec<TopCompletion> {
    let mut accepted: Vec<&CompletionCandidate> = candidates
        .iter()
        .filter(|c| c.final_decision == Decision::Accept)
        .collect();

    accepted.sort_by(|a, b| {
        b.final_score
            .cmp(&a.final_score)
            .then_with(|| a.submitted_at.cmp(&b.submitted_at))
            .then_with(|| a.completion_id.cmp(&b.completion_id))
    });

    accepted
        .into_iter()
        .take(TOP_SLOTS)
        .map(|c| TopCompletion {
            completion_id: c.completion_id.clone(),
            recipient: c.recipient.clone(),
            score: c.final_score,
        })
        .collect()
}
