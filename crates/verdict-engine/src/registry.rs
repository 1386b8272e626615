//! "Already settled" markers
//!
//! Settlement is pure and would happily run twice. The host owns the marker
//! that stops a campaign from being paid out twice; this trait is its seam.

use parking_lot::RwLock;
use std::collections::HashMap;
use verdict_core::CampaignId;

/// Record of campaigns that have been settled
pub trait SettlementRegistry: Send + Sync {
    /// Whether a settlement has been recorded
    fn is_settled(&self, campaign_id: &CampaignId) -> bool;

    /// Record a settlement. Returns `false` when one was already recorded.
    fn mark_settled(&self, campaign_id: &CampaignId, fingerprint: &str) -> bool;

    /// Fingerprint of the recorded settlement
    fn fingerprint(&self, campaign_id: &CampaignId) -> Option<String>;
}

/// Process-local registry for tests and single-process hosts
#[derive(Debug, Default)]
pub struct InMemorySettlementRegistry {
    settled: RwLock<HashMap<CampaignId, String>>,
}

impl InMemorySettlementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.settled.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.settled.read().is_empty()
    }
}

impl SettlementRegistry for InMemorySettlementRegistry {
    fn is_settled(&self, campaign_id: &CampaignId) -> bool {
        self.settled.read().contains_key(campaign_id)
    }

    fn mark_settled(&self, campaign_id: &CampaignId, fingerprint: &str) -> bool {
        let mut settled = self.settled.write();
        if settled.contains_key(campaign_id) {
            return false;
        }
        settled.insert(campaign_id.clone(), fingerprint.to_string());
        true
    }

    fn fingerprint(&self, campaign_id: &CampaignId) -> Option<String> {
        self.settled.read().get(campaign_id).cloned()
    }
}
