//! Error types for Verdict engine calls
//!
//! Every variant is a caller-input validation failure. The engine performs
//! no I/O, so nothing here describes a runtime fault.

use crate::types::{CampaignId, ContentId};
use thiserror::Error;

/// Result type alias for Verdict operations
pub type Result<T> = std::result::Result<T, VerdictError>;

/// Errors surfaced by the Verdict engine boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerdictError {
    // === Vote Input ===
    /// Negative stake, age, or experience. Reported as a notice: the value is
    /// clamped to zero and the vote proceeds.
    #[error("Invalid vote input: {field} = {value} (clamped to zero)")]
    InvalidVoteInput { field: &'static str, value: String },

    /// Score outside its permitted range, or missing where required
    #[error("Score out of range: {field} = {value}")]
    InvalidScoreRange { field: &'static str, value: f64 },

    /// Vote addressed to a different content item than the book it was cast into
    #[error("Vote for {found} cast into the book of {expected}")]
    VoteContentMismatch { expected: ContentId, found: ContentId },

    // === Campaign Input ===
    /// Non-positive or out-of-bounds campaign parameter
    #[error("Invalid economics input: {field} = {value}")]
    InvalidEconomicsInput { field: &'static str, value: String },

    /// Settlement inputs inconsistent with the campaign
    #[error("Invalid settlement input: {field}: {reason}")]
    InvalidSettlementInput { field: &'static str, reason: String },

    // === Boundary Preconditions ===
    /// Arbiter input supplied for an item that does not need one
    #[error("Arbiter input not permitted for status {status}")]
    ArbiterNotPermitted { status: String },

    /// Settlement requested twice for the same campaign
    #[error("Campaign already settled: {0}")]
    AlreadySettled(CampaignId),

    // === Configuration ===
    /// Engine configuration failed to load or validate
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VerdictError {
    /// Stable error code for API responses
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidVoteInput { .. } => 2001,
            Self::InvalidScoreRange { .. } => 2002,
            Self::InvalidEconomicsInput { .. } => 2003,
            Self::InvalidSettlementInput { .. } => 2004,
            Self::ArbiterNotPermitted { .. } => 2005,
            Self::AlreadySettled(_) => 2006,
            Self::VoteContentMismatch { .. } => 2007,
            Self::Config(_) => 9001,
        }
    }

    /// Offending field, when the error names one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidVoteInput { field, .. }
            | Self::InvalidScoreRange { field, .. }
            | Self::InvalidEconomicsInput { field, .. }
            | Self::InvalidSettlementInput { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Notices are informational: the call went ahead with a corrected value
    pub fn is_notice(&self) -> bool {
        matches!(self, Self::InvalidVoteInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = VerdictError::InvalidScoreRange {
            field: "quality_score",
            value: 101.0,
        };
        assert_eq!(err.code(), 2002);
        assert_eq!(err.field(), Some("quality_score"));

        let err = VerdictError::AlreadySettled(CampaignId::new("c-1"));
        assert_eq!(err.code(), 2006);
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_error_display() {
        let err = VerdictError::InvalidEconomicsInput {
            field: "unit_price",
            value: "0.00".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("unit_price"));
        assert!(msg.contains("0.00"));
    }

    #[test]
    fn test_notices() {
        let notice = VerdictError::InvalidVoteInput {
            field: "stake_amount",
            value: "-5.00".to_string(),
        };
        assert!(notice.is_notice());
        assert!(!VerdictError::Config("x".into()).is_notice());
    }
}
