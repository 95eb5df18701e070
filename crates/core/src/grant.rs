//! Per-(agent, viewer) access grants.
//!
//! A grant's `max_tier` is cumulative: `friends` implies `public`,
//! `intimate` implies both. Grants are upserted on the unique
//! (agent_id, viewer_handle) key — last write wins. The owner's implicit
//! `intimate` access is never stored as a row; resolution checks the owner
//! first.

use crate::agent::AgentId;
use crate::tier::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub agent_id: AgentId,

    /// Normalized viewer handle; unique per agent.
    pub viewer_handle: String,

    /// The highest tier this viewer may draw answers from.
    pub max_tier: Tier,

    pub granted_at: DateTime<Utc>,
}

impl PermissionGrant {
    pub fn new(agent_id: AgentId, viewer_handle: impl Into<String>, max_tier: Tier) -> Self {
        Self {
            agent_id,
            viewer_handle: viewer_handle.into(),
            max_tier,
            granted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_roundtrip() {
        let grant = PermissionGrant::new(AgentId::from("a1"), "bob", Tier::Friends);
        let json = serde_json::to_string(&grant).unwrap();
        let back: PermissionGrant = serde_json::from_str(&json).unwrap();
        assert_eq!(back.viewer_handle, "bob");
        assert_eq!(back.max_tier, Tier::Friends);
    }
}
