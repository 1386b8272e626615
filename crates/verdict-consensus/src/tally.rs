//! # Vote Aggregation
//!
//! Accumulates weighted votes into per-item running totals.
//!
//! The [`VoteBook`] enforces one vote per `(voter, item)`: a resubmission
//! replaces the earlier vote and the tally is rebuilt from the book, so a
//! replaced vote leaves no residue in the totals. [`VoteAggregator`] is the
//! streaming path for votes from voters not seen before.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use verdict_core::{
    Amount, ContentId, ContentKind, Decision, Result, Score, VerdictError, VoterId, Weight,
};

use crate::vote::Vote;
use crate::weight::{VoteWeight, WeightCalculator};

/// Running state for one content item
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedTally {
    /// Sum of combined weights on the accept side
    pub accept_weighted_score: Weight,

    /// Sum of combined weights on the reject side
    pub reject_weighted_score: Weight,

    pub accept_vote_count: u32,

    pub reject_vote_count: u32,

    /// Raw stake across all votes, both sides
    pub total_staked: Amount,

    /// Σ weight × quality over accept votes carrying a quality score
    #[serde(default)]
    pub quality_weighted_sum: Weight,

    /// Σ weight over accept votes carrying a quality score
    #[serde(default)]
    pub quality_weight_basis: Weight,

    /// Σ quality, unweighted
    #[serde(default)]
    pub quality_plain_sum: u64,

    #[serde(default)]
    pub quality_vote_count: u32,
}

impl AggregatedTally {
    /// Tally with no votes
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally assembled from totals held by an external store
    pub fn from_totals(
        accept_weighted_score: Weight,
        reject_weighted_score: Weight,
        accept_vote_count: u32,
        reject_vote_count: u32,
        total_staked: Amount,
    ) -> Self {
        Self {
            accept_weighted_score,
            reject_weighted_score,
            accept_vote_count,
            reject_vote_count,
            total_staked: total_staked.clamp_non_negative(),
            ..Self::default()
        }
    }

    pub fn total_votes(&self) -> u32 {
        self.accept_vote_count.saturating_add(self.reject_vote_count)
    }

    pub fn total_weight(&self) -> Weight {
        self.accept_weighted_score + self.reject_weighted_score
    }

    /// Side with the strictly larger weighted score
    pub fn dominant(&self) -> Option<Decision> {
        use std::cmp::Ordering;
        match self.accept_weighted_score.cmp(&self.reject_weighted_score) {
            Ordering::Greater => Some(Decision::Accept),
            Ordering::Less => Some(Decision::Reject),
            Ordering::Equal => None,
        }
    }

    /// `max(accept, reject)` and `min(accept, reject)`
    pub fn majority_minority(&self) -> (Weight, Weight) {
        let a = self.accept_weighted_score;
        let r = self.reject_weighted_score;
        (a.max(r), a.min(r))
    }

    /// Accept share of the total weight on the 0-100 scale; 50.00 with no weight
    pub fn community_score(&self) -> Score {
        Score::share_of(self.accept_weighted_score, self.total_weight())
            .unwrap_or(Score::MIDPOINT)
    }

    /// Weighted mean quality of accept votes, falling back to the plain mean
    /// when every scored vote carries zero weight
    pub fn average_quality(&self) -> Option<Score> {
        if !self.quality_weight_basis.is_zero() {
            let hundredths = self.quality_weighted_sum.raw() * 100 / self.quality_weight_basis.raw();
            return Score::from_hundredths(hundredths.min(Score::MAX_HUNDREDTHS as u128) as u32)
                .ok();
        }
        if self.quality_vote_count > 0 {
            let hundredths = self.quality_plain_sum * 100 / self.quality_vote_count as u64;
            return Score::from_hundredths(hundredths.min(Score::MAX_HUNDREDTHS as u64) as u32)
                .ok();
        }
        None
    }
}

/// Streaming accumulation of weighted votes
pub struct VoteAggregator;

impl VoteAggregator {
    /// Add one vote's contribution. Totals never decrease.
    pub fn accumulate(tally: &mut AggregatedTally, vote: &Vote, weight: &VoteWeight) {
        match vote.decision {
            Decision::Accept => {
                tally.accept_weighted_score += weight.combined;
                tally.accept_vote_count = tally.accept_vote_count.saturating_add(1);

                if let Some(q) = vote.quality_score {
                    let q = q.min(100);
                    tally.quality_weighted_sum +=
                        Weight::from_raw(weight.combined.raw() * q as u128);
                    tally.quality_weight_basis += weight.combined;
                    tally.quality_plain_sum += q as u64;
                    tally.quality_vote_count = tally.quality_vote_count.saturating_add(1);
                }
            }
            Decision::Reject => {
                tally.reject_weighted_score += weight.combined;
                tally.reject_vote_count = tally.reject_vote_count.saturating_add(1);
            }
        }
        tally.total_staked += vote.effective_stake();
    }
}

/// Outcome of casting a vote into a [`VoteBook`]
#[derive(Clone, Debug, PartialEq)]
pub struct CastReceipt {
    pub voter_id: VoterId,

    /// Decision of the vote this one replaced, if any
    pub previous_decision: Option<Decision>,

    /// Clamped-input notices
    pub notices: Vec<VerdictError>,
}

impl CastReceipt {
    pub fn replaced(&self) -> bool {
        self.previous_decision.is_some()
    }
}

/// All current votes on one content item, one per voter
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoteBook {
    content_id: ContentId,
    kind: ContentKind,
    votes: BTreeMap<VoterId, Vote>,
}

impl VoteBook {
    pub fn new(content_id: ContentId, kind: ContentKind) -> Self {
        Self {
            content_id,
            kind,
            votes: BTreeMap::new(),
        }
    }

    /// Load persisted vote rows. Later rows for the same voter replace earlier ones.
    pub fn from_votes(
        content_id: ContentId,
        kind: ContentKind,
        votes: impl IntoIterator<Item = Vote>,
    ) -> Result<(Self, Vec<VerdictError>)> {
        let mut book = Self::new(content_id, kind);
        let mut notices = Vec::new();
        for vote in votes {
            let receipt = book.cast(vote)?;
            notices.extend(receipt.notices);
        }
        Ok((book, notices))
    }

    /// Insert or replace a voter's vote
    pub fn cast(&mut self, vote: Vote) -> Result<CastReceipt> {
        if vote.content_id != self.content_id {
            return Err(VerdictError::VoteContentMismatch {
                expected: self.content_id.clone(),
                found: vote.content_id,
            });
        }

        let (vote, notices) = vote.sanitize();
        vote.validate(self.kind)?;

        let voter_id = vote.voter_id.clone();
        let previous = self.votes.insert(voter_id.clone(), vote);

        if let Some(prev) = &previous {
            tracing::debug!(
                "Vote from {} on {} replaced ({} -> {})",
                voter_id,
                self.content_id,
                prev.decision,
                self.votes[&voter_id].decision
            );
        }

        Ok(CastReceipt {
            voter_id,
            previous_decision: previous.map(|v| v.decision),
            notices,
        })
    }

    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn get(&self, voter_id: &VoterId) -> Option<&Vote> {
        self.votes.get(voter_id)
    }

    pub fn votes(&self) -> impl Iterator<Item = &Vote> {
        self.votes.values()
    }

    /// Rebuild the tally from every current vote
    pub fn tally(&self, calculator: &WeightCalculator) -> AggregatedTally {
        let mut tally = AggregatedTally::new();
        for vote in self.votes.values() {
            let weight = calculator.weigh(vote);
            VoteAggregator::accumulate(&mut tally, vote, &weight);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::ONE_WEIGHT;

    fn item() -> ContentId {
        ContentId::new("item-1")
    }

    fn staked(voter: &str, decision: Decision, stake: i64) -> Vote {
        Vote::new(voter, item(), decision).with_stake(Amount::from_units(stake), 30)
    }

    #[test]
    fn test_accumulate_updates_both_sides() {
        let calc = WeightCalculator::default();
        let mut tally = AggregatedTally::new();

        let a = staked("a", Decision::Accept, 100);
        let r = staked("r", Decision::Reject, 100);
        VoteAggregator::accumulate(&mut tally, &a, &calc.weigh(&a));
        VoteAggregator::accumulate(&mut tally, &r, &calc.weigh(&r));

        assert_eq!(tally.accept_vote_count, 1);
        assert_eq!(tally.reject_vote_count, 1);
        assert_eq!(tally.accept_weighted_score.raw(), ONE_WEIGHT / 2);
        assert_eq!(tally.reject_weighted_score.raw(), ONE_WEIGHT / 2);
        assert_eq!(tally.total_staked, Amount::from_units(200));
        assert_eq!(tally.dominant(), None);
        assert_eq!(tally.community_score().hundredths(), 5_000);
    }

    #[test]
    fn test_resubmission_replaces() {
        let calc = WeightCalculator::default();
        let mut book = VoteBook::new(item(), ContentKind::Submission);

        let first = book.cast(staked("0xABC", Decision::Accept, 100)).unwrap();
        assert!(!first.replaced());

        let second = book.cast(staked("0xabc", Decision::Reject, 300)).unwrap();
        assert!(second.replaced());
        assert_eq!(second.previous_decision, Some(Decision::Accept));

        assert_eq!(book.len(), 1);
        let tally = book.tally(&calc);
        assert_eq!(tally.accept_vote_count, 0);
        assert_eq!(tally.reject_vote_count, 1);
        assert_eq!(tally.total_staked, Amount::from_units(300));
        assert_eq!(tally.accept_weighted_score, Weight::ZERO);
    }

    #[test]
    fn test_cast_rejects_other_items() {
        let mut book = VoteBook::new(item(), ContentKind::Submission);
        let stray = Vote::new("a", ContentId::new("item-2"), Decision::Accept);
        assert!(matches!(
            book.cast(stray),
            Err(VerdictError::VoteContentMismatch { .. })
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn test_cast_rejects_bad_quality_without_storing() {
        let mut book = VoteBook::new(item(), ContentKind::Completion);
        let bad = staked("a", Decision::Accept, 10).with_quality(0);
        assert!(book.cast(bad).is_err());
        assert!(book.is_empty());
    }

    #[test]
    fn test_cast_reports_clamp_notices() {
        let mut book = VoteBook::new(item(), ContentKind::Submission);
        let receipt = book
            .cast(Vote::new("a", item(), Decision::Reject).with_stake(Amount::from_units(-1), 3))
            .unwrap();
        assert_eq!(receipt.notices.len(), 1);
        assert_eq!(book.get(&VoterId::new("a")).unwrap().stake_amount, Amount::ZERO);
    }

    #[test]
    fn test_from_votes_keeps_last_row() {
        let rows = vec![
            staked("a", Decision::Accept, 10),
            staked("b", Decision::Accept, 10),
            staked("A", Decision::Reject, 10),
        ];
        let (book, notices) = VoteBook::from_votes(item(), ContentKind::Submission, rows).unwrap();
        assert!(notices.is_empty());
        assert_eq!(book.len(), 2);
        assert_eq!(
            book.get(&VoterId::new("a")).unwrap().decision,
            Decision::Reject
        );
    }

    #[test]
    fn test_average_quality() {
        let calc = WeightCalculator::default();
        let mut book = VoteBook::new(item(), ContentKind::Completion);
        book.cast(staked("a", Decision::Accept, 100).with_quality(80)).unwrap();
        book.cast(staked("b", Decision::Accept, 100).with_quality(60)).unwrap();
        book.cast(staked("c", Decision::Reject, 100)).unwrap();

        let tally = book.tally(&calc);
        assert_eq!(tally.average_quality().unwrap().hundredths(), 7_000);
    }

    #[test]
    fn test_average_quality_falls_back_to_plain_mean() {
        let calc = WeightCalculator::default();
        let mut book = VoteBook::new(item(), ContentKind::Completion);
        // Fresh stakes carry no weight
        book.cast(Vote::new("a", item(), Decision::Accept).with_quality(90)).unwrap();
        book.cast(Vote::new("b", item(), Decision::Accept).with_quality(70)).unwrap();

        let tally = book.tally(&calc);
        assert_eq!(tally.average_quality().unwrap().hundredths(), 8_000);
        assert_eq!(AggregatedTally::new().average_quality(), None);
    }
}
