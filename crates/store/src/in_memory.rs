//! In-memory store — useful for testing and ephemeral sessions.

use confidant_core::agent::{Agent, AgentId};
use confidant_core::document::{Chunk, DocumentId, TrainingDocument};
use confidant_core::error::StorageError;
use confidant_core::grant::PermissionGrant;
use confidant_core::retrieval::Candidate;
use confidant_core::store::{AgentStore, ChunkStore, GrantStore};
use confidant_core::Tier;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One ingested document and its chunks, kept together so a snapshot of an
/// agent's corpus is a single read-lock acquisition.
struct StoredDocument {
    document: TrainingDocument,
    chunks: Vec<Chunk>,
}

/// An in-memory implementation of all three store traits.
#[derive(Clone)]
pub struct InMemoryStore {
    agents: Arc<RwLock<Vec<Agent>>>,
    documents: Arc<RwLock<Vec<StoredDocument>>>,
    /// Keyed by (agent id, normalized viewer handle). A single write lock
    /// makes each upsert an atomic read-modify-write per key.
    grants: Arc<RwLock<HashMap<(String, String), PermissionGrant>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            agents: Arc::new(RwLock::new(Vec::new())),
            documents: Arc::new(RwLock::new(Vec::new())),
            grants: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentStore for InMemoryStore {
    async fn create(&self, agent: Agent) -> Result<(), StorageError> {
        let mut agents = self.agents.write().await;
        if agents.iter().any(|a| a.handle == agent.handle) {
            return Err(StorageError::Duplicate(format!(
                "agent handle '{}'",
                agent.handle
            )));
        }
        agents.push(agent);
        Ok(())
    }

    async fn by_handle(&self, agent_handle: &str) -> Result<Option<Agent>, StorageError> {
        let agents = self.agents.read().await;
        Ok(agents.iter().find(|a| a.handle == agent_handle).cloned())
    }

    async fn by_id(&self, id: &AgentId) -> Result<Option<Agent>, StorageError> {
        let agents = self.agents.read().await;
        Ok(agents.iter().find(|a| &a.id == id).cloned())
    }

    async fn update_persona(&self, id: &AgentId, persona: &str) -> Result<bool, StorageError> {
        let mut agents = self.agents.write().await;
        match agents.iter_mut().find(|a| &a.id == id) {
            Some(agent) => {
                agent.persona = persona.to_string();
                agent.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ChunkStore for InMemoryStore {
    async fn append_document(
        &self,
        document: TrainingDocument,
        chunks: Vec<Chunk>,
    ) -> Result<(), StorageError> {
        self.documents
            .write()
            .await
            .push(StoredDocument { document, chunks });
        Ok(())
    }

    async fn candidates(
        &self,
        agent_id: &AgentId,
        ceiling: Tier,
    ) -> Result<Vec<Candidate>, StorageError> {
        // A single read-lock acquisition is the consistent snapshot:
        // documents appended after this point are not observed.
        let documents = self.documents.read().await;

        let mut out = Vec::new();
        for stored in documents.iter() {
            if &stored.document.agent_id != agent_id || stored.document.tier > ceiling {
                continue;
            }
            for chunk in &stored.chunks {
                out.push(Candidate {
                    chunk: chunk.clone(),
                    title: stored.document.title.clone(),
                    source: stored.document.source.clone(),
                    document_created_at: stored.document.created_at,
                });
            }
        }
        Ok(out)
    }

    async fn document(&self, id: &DocumentId) -> Result<Option<TrainingDocument>, StorageError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|s| &s.document.id == id)
            .map(|s| s.document.clone()))
    }

    async fn chunk_count(&self, agent_id: &AgentId) -> Result<usize, StorageError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|s| &s.document.agent_id == agent_id)
            .map(|s| s.chunks.len())
            .sum())
    }
}

#[async_trait]
impl GrantStore for InMemoryStore {
    async fn upsert(&self, grant: PermissionGrant) -> Result<(), StorageError> {
        let key = (grant.agent_id.0.clone(), grant.viewer_handle.clone());
        self.grants.write().await.insert(key, grant);
        Ok(())
    }

    async fn get(
        &self,
        agent_id: &AgentId,
        viewer_handle: &str,
    ) -> Result<Option<PermissionGrant>, StorageError> {
        let key = (agent_id.0.clone(), viewer_handle.to_string());
        Ok(self.grants.read().await.get(&key).cloned())
    }

    async fn list_for_agent(
        &self,
        agent_id: &AgentId,
    ) -> Result<Vec<PermissionGrant>, StorageError> {
        let grants = self.grants.read().await;
        let mut out: Vec<PermissionGrant> = grants
            .values()
            .filter(|g| &g.agent_id == agent_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.viewer_handle.cmp(&b.viewer_handle));
        Ok(out)
    }
}
