//! Permission resolution — owner first, stored grant second, public floor.
//!
//! The owner's unconditional `intimate` access is a direct handle
//! comparison, never a stored row, so the grant write path has no owner
//! special case to keep consistent. Absence of a grant row resolves to
//! `public`, never an error.

use confidant_core::agent::Agent;
use confidant_core::error::Result;
use confidant_core::grant::PermissionGrant;
use confidant_core::handle;
use confidant_core::store::GrantStore;
use confidant_core::Tier;
use std::sync::Arc;
use tracing::{debug, info};

/// Grant policy layered over a [`GrantStore`].
#[derive(Clone)]
pub struct Permissions {
    grants: Arc<dyn GrantStore>,
}

impl Permissions {
    pub fn new(grants: Arc<dyn GrantStore>) -> Self {
        Self { grants }
    }

    /// Upsert a viewer's maximum tier for `agent` — last write wins.
    ///
    /// The owner's implicit grant is never materialized: upserting for the
    /// owner's own handle is a no-op.
    pub async fn set_grant(
        &self,
        agent: &Agent,
        viewer_handle: &str,
        max_tier: Tier,
    ) -> Result<()> {
        let viewer = handle::required(viewer_handle, "viewer handle")?;

        if viewer == agent.owner_handle {
            debug!(
                agent = %agent.handle,
                "Grant for owner skipped; implicit access is never stored"
            );
            return Ok(());
        }

        self.grants
            .upsert(PermissionGrant::new(agent.id.clone(), viewer.clone(), max_tier))
            .await?;

        info!(agent = %agent.handle, viewer = %viewer, tier = %max_tier, "Grant upserted");
        Ok(())
    }

    /// Resolve the viewer's granted ceiling for `agent`: owner → intimate,
    /// else the stored grant's tier, else `public`.
    pub async fn resolve(&self, agent: &Agent, viewer_handle: &str) -> Result<Tier> {
        let viewer = handle::required(viewer_handle, "viewer handle")?;

        if viewer == agent.owner_handle {
            return Ok(Tier::Intimate);
        }

        let grant = self.grants.get(&agent.id, &viewer).await?;
        Ok(grant.map(|g| g.max_tier).unwrap_or(Tier::Public))
    }

    /// All stored grants for an agent (owner administration views).
    pub async fn list(&self, agent: &Agent) -> Result<Vec<PermissionGrant>> {
        Ok(self.grants.list_for_agent(&agent.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryStore;

    fn setup() -> (Permissions, Agent) {
        let store = Arc::new(InMemoryStore::new());
        let agent = Agent::new("luna", "alice", "persona").unwrap();
        (Permissions::new(store), agent)
    }

    #[tokio::test]
    async fn no_grant_row_resolves_to_public() {
        let (permissions, agent) = setup();
        let tier = permissions.resolve(&agent, "stranger").await.unwrap();
        assert_eq!(tier, Tier::Public);
    }

    #[tokio::test]
    async fn owner_resolves_to_intimate_without_a_row() {
        let (permissions, agent) = setup();
        assert_eq!(permissions.resolve(&agent, "alice").await.unwrap(), Tier::Intimate);
        // Case and whitespace don't matter.
        assert_eq!(permissions.resolve(&agent, " Alice ").await.unwrap(), Tier::Intimate);
        assert!(permissions.list(&agent).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stored_grant_is_returned() {
        let (permissions, agent) = setup();
        permissions.set_grant(&agent, "Bob", Tier::Friends).await.unwrap();
        assert_eq!(permissions.resolve(&agent, "bob").await.unwrap(), Tier::Friends);
        assert_eq!(permissions.resolve(&agent, " BOB ").await.unwrap(), Tier::Friends);
    }

    #[tokio::test]
    async fn set_grant_overwrites_and_can_lower() {
        let (permissions, agent) = setup();
        permissions.set_grant(&agent, "bob", Tier::Intimate).await.unwrap();
        permissions.set_grant(&agent, "bob", Tier::Public).await.unwrap();
        assert_eq!(permissions.resolve(&agent, "bob").await.unwrap(), Tier::Public);
    }

    #[tokio::test]
    async fn grant_for_owner_is_never_stored() {
        let (permissions, agent) = setup();
        permissions.set_grant(&agent, "ALICE", Tier::Public).await.unwrap();
        assert!(permissions.list(&agent).await.unwrap().is_empty());
        // Owner still resolves to intimate.
        assert_eq!(permissions.resolve(&agent, "alice").await.unwrap(), Tier::Intimate);
    }

    #[tokio::test]
    async fn empty_viewer_handle_is_a_validation_error() {
        let (permissions, agent) = setup();
        assert!(permissions.set_grant(&agent, "  ", Tier::Public).await.is_err());
        assert!(permissions.resolve(&agent, "").await.is_err());
    }
}
