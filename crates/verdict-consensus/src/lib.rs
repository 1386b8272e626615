//! # Hybrid Moderation Consensus
//!
//! Decides whether a content item is accepted or rejected by its moderators.
//!
//! ## Pipeline
//!
//! ```text
//!  Vote ──► WeightCalculator ──► VoteBook / VoteAggregator ──► AggregatedTally
//!                                                                   │
//!                                              ConsensusEvaluator ◄─┘
//!                                                    │  (window closed, undecided)
//!                                                    ├──► AutoResolvePolicy
//!                                                    ▼
//!                                              SuperArbiterBlender (escalated / always)
//! ```
//!
//! 1. Weighting - each vote earns a plutocratic share (diminishing in stake),
//!    scaled by an experience multiplier and a stake-age factor
//! 2. Aggregation - one vote per voter; a resubmission replaces the old one
//! 3. Evaluation - quorum, collateral, and ratio gates
//! 4. Auto-resolve - a closed window forces a terminal outcome
//! 5. Arbitration - a privileged judgment blends the score and overrides the decision
//!
//! Every step is a pure function of its inputs. No component reads a clock.

pub mod arbiter;
pub mod auto_resolve;
pub mod evaluator;
pub mod tally;
pub mod vote;
pub mod weight;

// Re-exports
pub use arbiter::{
    requires_arbiter, ArbiterConfig, ArbiterInput, ArbiterMode, CommunityVerdict, FinalDecision,
    SuperArbiterBlender,
};
pub use auto_resolve::AutoResolvePolicy;
pub use evaluator::{
    AcceptRatio, ConsensusConfig, ConsensusEvaluator, ConsensusResult, ConsensusStatus,
    GateBreakdown, Resolution,
};
pub use tally::{AggregatedTally, CastReceipt, VoteAggregator, VoteBook};
pub use vote::Vote;
pub use weight::{VoteWeight, WeightCalculator, WeightConfig};
