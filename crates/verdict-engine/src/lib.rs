//! # Verdict Engine
//!
//! Hybrid moderation consensus and reward settlement, exposed as four pure
//! calls on a configured [`ModerationEngine`].
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!  P, N ────────► │ derive_economics ──► CampaignEconomics       │
//!  votes ───────► │ evaluate ──────────► ConsensusResult         │
//!  arbiter ─────► │ blend ─────────────► FinalDecision           │
//!  CR, top 3 ───► │ settle ────────────► SettlementPlan          │
//!                 └──────────────────────────────────────────────┘
//! ```
//!
//! Nothing here reads a clock or touches storage. The host supplies the
//! current time, persists results, and guards against double settlement
//! through a [`SettlementRegistry`].

pub mod config;
pub mod engine;
pub mod registry;

pub use config::EngineConfig;
pub use engine::{CampaignPolicy, ItemDecision, ModerationEngine, SettledCampaign};
pub use registry::{InMemorySettlementRegistry, SettlementRegistry};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{CampaignPolicy, ItemDecision, ModerationEngine, SettledCampaign};
    pub use crate::registry::{InMemorySettlementRegistry, SettlementRegistry};
    pub use verdict_consensus::{
        ArbiterInput, ArbiterMode, AutoResolvePolicy, ConsensusResult, ConsensusStatus,
        FinalDecision, Vote, VoteBook,
    };
    pub use verdict_core::prelude::*;
    pub use verdict_economics::{
        rank_top_completions, CampaignEconomics, CompletionCandidate, SettlementPlan,
        TopCompletion,
    };
}
