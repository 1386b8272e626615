//! A single moderator's vote

use serde::{Deserialize, Serialize};
use verdict_core::{Amount, ContentId, ContentKind, Decision, Result, VerdictError, VoterId};

/// Lowest permitted quality score
pub const MIN_QUALITY_SCORE: u32 = 1;

/// Highest permitted quality score
pub const MAX_QUALITY_SCORE: u32 = 100;

/// One participant's judgment on one content item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    /// Case-normalised voter identity
    pub voter_id: VoterId,

    /// Item being judged
    pub content_id: ContentId,

    /// Accept or reject
    pub decision: Decision,

    /// Collateral committed with the vote
    #[serde(default)]
    pub stake_amount: Amount,

    /// Days since the stake was committed
    #[serde(default)]
    pub stake_age_days: i64,

    /// Voter's accumulated experience
    #[serde(default)]
    pub experience_score: i64,

    /// 1-100, required on Accept votes for completion items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u32>,
}

impl Vote {
    /// Create a vote with no stake and no experience
    pub fn new(voter_id: impl Into<VoterId>, content_id: ContentId, decision: Decision) -> Self {
        Self {
            voter_id: voter_id.into(),
            content_id,
            decision,
            stake_amount: Amount::ZERO,
            stake_age_days: 0,
            experience_score: 0,
            quality_score: None,
        }
    }

    pub fn with_stake(mut self, amount: Amount, age_days: i64) -> Self {
        self.stake_amount = amount;
        self.stake_age_days = age_days;
        self
    }

    pub fn with_experience(mut self, experience_score: i64) -> Self {
        self.experience_score = experience_score;
        self
    }

    pub fn with_quality(mut self, quality_score: u32) -> Self {
        self.quality_score = Some(quality_score);
        self
    }

    /// Clamp negative numeric inputs to zero.
    ///
    /// Each clamped field is reported as an `InvalidVoteInput` notice; the
    /// vote itself is always kept.
    pub fn sanitize(mut self) -> (Self, Vec<VerdictError>) {
        let mut notices = Vec::new();

        if self.stake_amount.is_negative() {
            notices.push(VerdictError::InvalidVoteInput {
                field: "stake_amount",
                value: self.stake_amount.to_string(),
            });
            self.stake_amount = Amount::ZERO;
        }
        if self.stake_age_days < 0 {
            notices.push(VerdictError::InvalidVoteInput {
                field: "stake_age_days",
                value: self.stake_age_days.to_string(),
            });
            self.stake_age_days = 0;
        }
        if self.experience_score < 0 {
            notices.push(VerdictError::InvalidVoteInput {
                field: "experience_score",
                value: self.experience_score.to_string(),
            });
            self.experience_score = 0;
        }

        for notice in &notices {
            tracing::warn!("Vote from {} adjusted: {}", self.voter_id, notice);
        }

        (self, notices)
    }

    /// Check the quality score for the item kind.
    ///
    /// Accept votes must carry a score in `[1, 100]` on completion items, and
    /// any score present on an Accept vote must be in range.
    pub fn validate(&self, kind: ContentKind) -> Result<()> {
        if self.decision != Decision::Accept {
            return Ok(());
        }

        match self.quality_score {
            Some(q) if !(MIN_QUALITY_SCORE..=MAX_QUALITY_SCORE).contains(&q) => {
                Err(VerdictError::InvalidScoreRange {
                    field: "quality_score",
                    value: q as f64,
                })
            }
            None if kind.requires_quality_score() => Err(VerdictError::InvalidScoreRange {
                field: "quality_score",
                value: f64::NAN,
            }),
            _ => Ok(()),
        }
    }

    /// Stake with negative values treated as zero
    pub fn effective_stake(&self) -> Amount {
        self.stake_amount.clamp_non_negative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(decision: Decision) -> Vote {
        Vote::new("0xVoter", ContentId::new("item-1"), decision)
    }

    #[test]
    fn test_sanitize_clamps_negatives() {
        let v = vote(Decision::Accept)
            .with_stake(Amount::from_units(-5), -3)
            .with_experience(-10);

        let (clean, notices) = v.sanitize();

        assert_eq!(clean.stake_amount, Amount::ZERO);
        assert_eq!(clean.stake_age_days, 0);
        assert_eq!(clean.experience_score, 0);
        assert_eq!(notices.len(), 3);
        assert!(notices.iter().all(|n| n.is_notice()));
    }

    #[test]
    fn test_sanitize_leaves_valid_votes_alone() {
        let v = vote(Decision::Reject).with_stake(Amount::from_units(50), 12);
        let (clean, notices) = v.clone().sanitize();
        assert_eq!(clean, v);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_quality_required_on_completion_accept() {
        let missing = vote(Decision::Accept);
        assert!(matches!(
            missing.validate(ContentKind::Completion),
            Err(VerdictError::InvalidScoreRange { .. })
        ));
        assert!(missing.validate(ContentKind::Submission).is_ok());

        assert!(vote(Decision::Accept)
            .with_quality(100)
            .validate(ContentKind::Completion)
            .is_ok());
        assert!(vote(Decision::Accept)
            .with_quality(0)
            .validate(ContentKind::Completion)
            .is_err());
        assert!(vote(Decision::Accept)
            .with_quality(101)
            .validate(ContentKind::Submission)
            .is_err());
    }

    #[test]
    fn test_reject_votes_skip_quality_check() {
        let v = vote(Decision::Reject).with_quality(250);
        assert!(v.validate(ContentKind::Completion).is_ok());
    }

    #[test]
    fn test_voter_id_is_normalised() {
        let v = vote(Decision::Accept);
        assert_eq!(v.voter_id.as_str(), "0xvoter");
    }
}
