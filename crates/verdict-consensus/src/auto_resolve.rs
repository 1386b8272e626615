//! Auto-resolve policy for items still undecided when the vote window closes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use verdict_core::Decision;

use crate::evaluator::ConsensusStatus;
use crate::tally::AggregatedTally;

/// Terminal outcome forced on a closed, undecided item.
///
/// Chosen per campaign at creation time. There is deliberately no `Default`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoResolvePolicy {
    /// Route the item to the super-arbiter
    Escalate,
    /// Simple weighted majority, ratio gate waived. A tie rejects.
    MajorityWins,
    /// Reject unconditionally
    Reject,
}

impl AutoResolvePolicy {
    /// Resolve a closed tally. Pure and idempotent.
    pub fn resolve(&self, tally: &AggregatedTally) -> ConsensusStatus {
        match self {
            Self::Escalate => ConsensusStatus::Escalated,
            Self::MajorityWins => match tally.dominant() {
                Some(Decision::Accept) => ConsensusStatus::Validated,
                Some(Decision::Reject) | None => ConsensusStatus::Rejected,
            },
            Self::Reject => ConsensusStatus::Rejected,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Escalate => "escalate",
            Self::MajorityWins => "majority_wins",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for AutoResolvePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AutoResolvePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "escalate" => Ok(Self::Escalate),
            "majority_wins" | "majoritywins" => Ok(Self::MajorityWins),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown auto-resolve policy: {}", other)),
        }
    }
}
