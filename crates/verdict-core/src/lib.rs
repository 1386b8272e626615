//! # Verdict Core
//!
//! Value types shared by every crate of the Verdict moderation engine.
//!
//! - [`Amount`] - signed currency in micro-units (6 decimals)
//! - [`Weight`] - unsigned 18-decimal fixed point used for vote weights
//! - [`Score`] - a 0-100 score carried in hundredths
//! - identifiers ([`VoterId`], [`ContentId`], [`CampaignId`], [`ParticipantId`])
//! - [`VerdictError`] - the caller-input validation taxonomy
//!
//! Every value here is plain data. Nothing in this crate reads a clock,
//! touches I/O, or holds shared state.

pub mod amount;
pub mod error;
pub mod fixed;
pub mod types;

pub use amount::*;
pub use error::*;
pub use fixed::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::amount::{Amount, ONE_CENT, ONE_UNIT};
    pub use crate::error::{Result, VerdictError};
    pub use crate::fixed::{Score, Weight, BPS_ONE, ONE_WEIGHT};
    pub use crate::types::*;
}
