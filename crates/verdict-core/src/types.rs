//! Core type definitions for the Verdict engine
//!
//! Identifiers are opaque strings owned by the hosting system. The engine
//! only compares them; it never resolves them to wallets or accounts.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Content item under moderation (a submission or a completion)
    ContentId
);

string_id!(
    /// Campaign that owns content items and their economics
    CampaignId
);

string_id!(
    /// A payout recipient: creator, completer, or moderator
    ParticipantId
);

/// Voter identity key.
///
/// Case-normalised on construction so `0xAbC` and `0xabc` are the same voter.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct VoterId(String);

impl VoterId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for VoterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

impl fmt::Debug for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VoterId({})", self.0)
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VoterId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Binary judgment on a content item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn opposite(self) -> Self {
        match self {
            Self::Accept => Self::Reject,
            Self::Reject => Self::Accept,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What kind of content a vote judges
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Campaign content submitted for listing
    #[default]
    Submission,
    /// A participant's completion of a campaign; Accept votes carry a quality score
    Completion,
}

impl ContentKind {
    pub fn requires_quality_score(&self) -> bool {
        matches!(self, Self::Completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voter_id_normalisation() {
        let a = VoterId::new("  0xAbCdEf ");
        let b = VoterId::new("0xabcdef");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0xabcdef");

        let parsed: VoterId = serde_json::from_str("\"0xABCDEF\"").unwrap();
        assert_eq!(parsed, b);
    }

    #[test]
    fn test_decision_serde() {
        assert_eq!(serde_json::to_string(&Decision::Accept).unwrap(), "\"accept\"");
        assert_eq!(Decision::Reject.opposite(), Decision::Accept);
    }

    #[test]
    fn test_string_ids() {
        let id = ContentId::new("item-1");
        assert_eq!(id.to_string(), "item-1");
        assert_eq!(format!("{:?}", id), "ContentId(item-1)");
    }
}
