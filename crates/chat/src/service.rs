//! The application-facing service — every operation a transport exposes.
//!
//! Wraps the orchestrator with the owner-gated administrative operations
//! (create agent, update persona, ingest, grants) so the HTTP gateway and
//! the CLI share one implementation of the ownership checks.

use crate::orchestrator::{AskOutcome, ChatOrchestrator};
use confidant_core::agent::{Agent, AgentSummary, validate_persona};
use confidant_core::document::IngestReceipt;
use confidant_core::error::{Error, Result, StorageError};
use confidant_core::grant::PermissionGrant;
use confidant_core::handle;
use confidant_core::store::AgentStore;
use confidant_core::Tier;
use confidant_ingest::Ingestor;
use confidant_store::Permissions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ConfidantService {
    agents: Arc<dyn AgentStore>,
    permissions: Permissions,
    ingestor: Arc<Ingestor>,
    orchestrator: ChatOrchestrator,
}

impl ConfidantService {
    pub fn new(
        agents: Arc<dyn AgentStore>,
        permissions: Permissions,
        ingestor: Arc<Ingestor>,
        orchestrator: ChatOrchestrator,
    ) -> Self {
        Self { agents, permissions, ingestor, orchestrator }
    }

    /// Create an agent owned by `owner_handle`.
    pub async fn create_agent(
        &self,
        agent_handle: &str,
        owner_handle: &str,
        persona: &str,
    ) -> Result<AgentSummary> {
        let agent = Agent::new(agent_handle, owner_handle, persona)?;
        let summary = agent.summary_for(owner_handle);

        match self.agents.create(agent).await {
            Ok(()) => {
                info!(agent = %summary.handle, owner = %summary.owner_handle, "Agent created");
                Ok(summary)
            }
            Err(StorageError::Duplicate(_)) => Err(Error::validation(format!(
                "agent handle '{}' is already taken",
                summary.handle
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up an agent. The persona is included only when the caller is
    /// the owner; the response shape is otherwise identical.
    pub async fn lookup_agent(&self, agent_handle: &str, viewer_handle: &str) -> Result<AgentSummary> {
        let agent = self.agent_by_handle(agent_handle).await?;
        Ok(agent.summary_for(viewer_handle))
    }

    /// Replace the persona. Owner only; the length cap is re-checked here
    /// regardless of what the caller already validated.
    pub async fn update_persona(
        &self,
        agent_handle: &str,
        caller_handle: &str,
        persona: &str,
    ) -> Result<AgentSummary> {
        validate_persona(persona)?;
        let agent = self.owned_agent(agent_handle, caller_handle, "update the persona").await?;

        self.agents.update_persona(&agent.id, persona).await?;
        info!(agent = %agent.handle, persona_chars = persona.chars().count(), "Persona updated");

        let mut updated = agent;
        updated.persona = persona.to_string();
        Ok(updated.summary_for(caller_handle))
    }

    /// Ingest a training document for an agent. Owner only.
    pub async fn ingest_document(
        &self,
        agent_handle: &str,
        caller_handle: &str,
        tier: Tier,
        title: Option<String>,
        source: Option<String>,
        content: &str,
    ) -> Result<IngestReceipt> {
        let agent = self.owned_agent(agent_handle, caller_handle, "ingest documents").await?;
        self.ingestor.ingest(&agent.id, tier, title, source, content).await
    }

    /// Upsert a viewer's maximum tier. Owner only; last write wins, and
    /// upserting `public` doubles as revocation.
    pub async fn set_grant(
        &self,
        agent_handle: &str,
        caller_handle: &str,
        viewer_handle: &str,
        max_tier: Tier,
    ) -> Result<()> {
        let agent = self.owned_agent(agent_handle, caller_handle, "manage grants").await?;
        self.permissions.set_grant(&agent, viewer_handle, max_tier).await
    }

    /// All stored grants for an agent. Owner only.
    pub async fn list_grants(
        &self,
        agent_handle: &str,
        caller_handle: &str,
    ) -> Result<Vec<PermissionGrant>> {
        let agent = self.owned_agent(agent_handle, caller_handle, "list grants").await?;
        self.permissions.list(&agent).await
    }

    /// Answer a question as `viewer_handle`, at most at `requested_tier`.
    pub async fn ask(
        &self,
        agent_handle: &str,
        viewer_handle: &str,
        requested_tier: Tier,
        question: &str,
    ) -> Result<AskOutcome> {
        self.orchestrator
            .ask(agent_handle, viewer_handle, requested_tier, question)
            .await
    }

    async fn agent_by_handle(&self, agent_handle: &str) -> Result<Agent> {
        let agent_handle = handle::required(agent_handle, "agent handle")?;
        self.agents
            .by_handle(&agent_handle)
            .await?
            .ok_or_else(|| Error::not_found(format!("agent '{agent_handle}'")))
    }

    async fn owned_agent(
        &self,
        agent_handle: &str,
        caller_handle: &str,
        action: &str,
    ) -> Result<Agent> {
        let agent = self.agent_by_handle(agent_handle).await?;
        if !agent.is_owner(caller_handle) {
            return Err(Error::forbidden(format!("only the owner may {action}")));
        }
        Ok(agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::PersonaComposer;
    use confidant_core::store::ChunkStore;
    use confidant_core::PERSONA_MAX_CHARS;
    use confidant_providers::ScriptedGenerator;
    use confidant_retrieval::{KeywordScorer, RetrievalFilter};
    use confidant_store::InMemoryStore;

    fn service() -> ConfidantService {
        let store = InMemoryStore::new();
        let agents: Arc<dyn AgentStore> = Arc::new(store.clone());
        let chunk_store: Arc<dyn ChunkStore> = Arc::new(store.clone());
        let permissions = Permissions::new(Arc::new(store.clone()));

        let orchestrator = ChatOrchestrator::new(
            agents.clone(),
            permissions.clone(),
            RetrievalFilter::new(chunk_store.clone(), Arc::new(KeywordScorer)),
            PersonaComposer::with_default_budget(),
            Arc::new(ScriptedGenerator::answering("an answer")),
        );

        ConfidantService::new(agents, permissions, Arc::new(Ingestor::new(chunk_store)), orchestrator)
    }

    #[tokio::test]
    async fn duplicate_agent_handle_is_a_validation_error() {
        let service = service();
        service.create_agent("luna", "alice", "p").await.unwrap();
        let err = service.create_agent("Luna", "bob", "p").await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn lookup_hides_persona_from_non_owner() {
        let service = service();
        service.create_agent("luna", "alice", "the persona").await.unwrap();

        let for_owner = service.lookup_agent("luna", "alice").await.unwrap();
        assert_eq!(for_owner.persona.as_deref(), Some("the persona"));

        let for_viewer = service.lookup_agent("luna", "bob").await.unwrap();
        assert!(for_viewer.persona.is_none());
    }

    #[tokio::test]
    async fn persona_update_is_owner_only_and_capped() {
        let service = service();
        service.create_agent("luna", "alice", "old").await.unwrap();

        let err = service.update_persona("luna", "bob", "hijacked").await.unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));

        // Exactly at the cap succeeds.
        let at_cap = "x".repeat(PERSONA_MAX_CHARS);
        let updated = service.update_persona("luna", "alice", &at_cap).await.unwrap();
        assert_eq!(updated.persona.unwrap().len(), PERSONA_MAX_CHARS);

        // One over fails, before any ownership lookup side effects.
        let over = "x".repeat(PERSONA_MAX_CHARS + 1);
        let err = service.update_persona("luna", "alice", &over).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn ingest_and_grants_are_owner_only() {
        let service = service();
        service.create_agent("luna", "alice", "p").await.unwrap();

        let err = service
            .ingest_document("luna", "bob", Tier::Public, None, None, "text")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));

        let err = service
            .set_grant("luna", "bob", "carol", Tier::Friends)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));

        // The owner can do both.
        let receipt = service
            .ingest_document("luna", "Alice", Tier::Friends, None, None, "some text")
            .await
            .unwrap();
        assert_eq!(receipt.chunk_count, 1);
        service.set_grant("luna", "alice", "carol", Tier::Friends).await.unwrap();
        assert_eq!(service.list_grants("luna", "alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_agent_is_not_found() {
        let service = service();
        let err = service.lookup_agent("ghost", "alice").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
