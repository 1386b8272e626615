//! # Consensus Evaluator
//!
//! State machine deciding a content item from its aggregated tally.
//!
//! ## Gates
//!
//! A terminal decision outside the escalation path requires ALL of:
//! 1. Quorum - `accept_votes + reject_votes >= V_MIN`
//! 2. Collateral - `total_staked > unit_price` (strictly)
//! 3. Ratio - `max(accept, reject) >= R_MIN × min(accept, reject)`, with a
//!    strictly positive majority
//!
//! ## State Transitions
//!
//! ```text
//! PendingRequirements ──(all gates)──► Validated | Rejected
//!         │
//!         └──(window closed)──► AutoResolvePolicy ──► Validated | Rejected | Escalated
//! ```
//!
//! Each evaluation returns a fresh [`ConsensusResult`]; nothing is mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use verdict_core::{Amount, Decision, Score, BPS_ONE};

use crate::auto_resolve::AutoResolvePolicy;
use crate::tally::AggregatedTally;

/// Consensus gate configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Minimum total voters (V_MIN)
    #[serde(default = "default_min_voters")]
    pub min_voters: u32,

    /// Minimum majority:minority ratio in basis points (R_MIN)
    #[serde(default = "default_min_ratio_bps")]
    pub min_ratio_bps: u64,
}

fn default_min_voters() -> u32 {
    22
}

fn default_min_ratio_bps() -> u64 {
    2 * BPS_ONE
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            min_voters: default_min_voters(),
            min_ratio_bps: default_min_ratio_bps(),
        }
    }
}

/// Moderation status of a content item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusStatus {
    /// Gates not yet met, voting continues
    PendingRequirements,
    /// Accepted
    Validated,
    /// Rejected
    Rejected,
    /// Routed to the super-arbiter
    Escalated,
}

impl ConsensusStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Validated | Self::Rejected)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingRequirements)
    }

    /// Binary outcome of a terminal status
    pub fn decision(&self) -> Option<Decision> {
        match self {
            Self::Validated => Some(Decision::Accept),
            Self::Rejected => Some(Decision::Reject),
            Self::PendingRequirements | Self::Escalated => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PendingRequirements => "pending_requirements",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
            Self::Escalated => "escalated",
        }
    }
}

impl fmt::Display for ConsensusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accept-to-reject weighted ratio, safe against a zero reject side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AcceptRatio {
    /// `accept / reject` in basis points
    Finite { bps: u64 },
    /// Reject side is exactly zero
    NoMinority,
}

impl AcceptRatio {
    pub fn from_tally(tally: &AggregatedTally) -> Self {
        match tally
            .accept_weighted_score
            .ratio_bps(tally.reject_weighted_score)
        {
            Some(bps) => Self::Finite { bps },
            None => Self::NoMinority,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Finite { bps } => *bps as f64 / BPS_ONE as f64,
            Self::NoMinority => f64::INFINITY,
        }
    }
}

/// Human-auditable gate breakdown
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateBreakdown {
    pub quorum_met: bool,
    pub collateral_met: bool,
    pub ratio_met: bool,

    pub total_votes: u32,
    pub required_votes: u32,

    pub total_staked: Amount,
    pub unit_price: Amount,

    /// Majority:minority in basis points, `None` when the minority is zero
    pub majority_ratio_bps: Option<u64>,
    pub required_ratio_bps: u64,

    /// Side with the strictly larger weighted score
    pub dominant: Option<Decision>,

    pub window_closed: bool,
}

impl GateBreakdown {
    pub fn all_met(&self) -> bool {
        self.quorum_met && self.collateral_met && self.ratio_met
    }
}

/// How the status was reached
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Derived from the gates alone
    Gates,
    /// Forced at window close
    AutoResolved { policy: AutoResolvePolicy },
}

/// Immutable snapshot of one evaluation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub status: ConsensusStatus,
    pub accept_ratio: AcceptRatio,
    pub breakdown: GateBreakdown,
    pub resolution: Resolution,

    /// Accept share of the weighted total on the 0-100 scale
    pub community_score: Score,

    /// Caller-supplied evaluation time
    pub evaluated_at: DateTime<Utc>,
}

/// Consensus evaluator
#[derive(Clone, Debug, Default)]
pub struct ConsensusEvaluator {
    config: ConsensusConfig,
}

impl ConsensusEvaluator {
    pub fn new(config: ConsensusConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Evaluate the three gates without regard to time
    pub fn gates(&self, tally: &AggregatedTally, unit_price: Amount) -> GateBreakdown {
        let total_votes = tally.total_votes();
        let quorum_met = total_votes >= self.config.min_voters;
        let collateral_met = tally.total_staked > unit_price;

        let (majority, minority) = tally.majority_minority();
        let ratio_met = !majority.is_zero()
            && majority.raw().saturating_mul(BPS_ONE as u128)
                >= minority.raw().saturating_mul(self.config.min_ratio_bps as u128);

        GateBreakdown {
            quorum_met,
            collateral_met,
            ratio_met,
            total_votes,
            required_votes: self.config.min_voters,
            total_staked: tally.total_staked,
            unit_price,
            majority_ratio_bps: majority.ratio_bps(minority),
            required_ratio_bps: self.config.min_ratio_bps,
            dominant: tally.dominant(),
            window_closed: false,
        }
    }

    /// Evaluate a tally at `now` against a vote window ending at `window_end`.
    ///
    /// Pending items at or after the window end go through `policy`.
    pub fn evaluate(
        &self,
        tally: &AggregatedTally,
        unit_price: Amount,
        now: DateTime<Utc>,
        window_end: DateTime<Utc>,
        policy: AutoResolvePolicy,
    ) -> ConsensusResult {
        let mut breakdown = self.gates(tally, unit_price);
        breakdown.window_closed = now >= window_end;

        let gate_status = if breakdown.all_met() {
            match breakdown.dominant {
                Some(Decision::Accept) => ConsensusStatus::Validated,
                Some(Decision::Reject) => ConsensusStatus::Rejected,
                // ratio gate requires a strictly positive majority, so a tie never gets here
                None => ConsensusStatus::PendingRequirements,
            }
        } else {
            ConsensusStatus::PendingRequirements
        };

        let (status, resolution) = if gate_status.is_pending() && breakdown.window_closed {
            (policy.resolve(tally), Resolution::AutoResolved { policy })
        } else {
            (gate_status, Resolution::Gates)
        };

        tracing::debug!(
            "Evaluated tally: status={} votes={}/{} staked={} price={} quorum={} collateral={} ratio={} window_closed={}",
            status,
            breakdown.total_votes,
            breakdown.required_votes,
            breakdown.total_staked,
            breakdown.unit_price,
            breakdown.quorum_met,
            breakdown.collateral_met,
            breakdown.ratio_met,
            breakdown.window_closed
        );

        ConsensusResult {
            status,
            accept_ratio: AcceptRatio::from_tally(tally),
            breakdown,
            resolution,
            community_score: tally.community_score(),
            evaluated_at: now,
        }
    }
}
