//! Store traits — the persistence seams for agents, chunks, and grants.
//!
//! Implementations: in-memory (testing, ephemeral sessions) and SQLite
//! (durable). Callers pass handles already normalized via [`crate::handle`];
//! stores compare them byte-for-byte.

use crate::agent::{Agent, AgentId};
use crate::document::{Chunk, DocumentId, TrainingDocument};
use crate::error::StorageError;
use crate::grant::PermissionGrant;
use crate::retrieval::Candidate;
use crate::tier::Tier;
use async_trait::async_trait;

/// Agent persistence.
#[async_trait]
pub trait AgentStore: Send + Sync {
    /// Create a new agent. Fails with [`StorageError::Duplicate`] if the
    /// handle is already taken.
    async fn create(&self, agent: Agent) -> Result<(), StorageError>;

    /// Look up an agent by its normalized handle.
    async fn by_handle(&self, agent_handle: &str) -> Result<Option<Agent>, StorageError>;

    /// Look up an agent by id.
    async fn by_id(&self, id: &AgentId) -> Result<Option<Agent>, StorageError>;

    /// Replace the persona text. Returns false if the agent does not exist.
    /// Length validation happens at the entry points, not here.
    async fn update_persona(&self, id: &AgentId, persona: &str) -> Result<bool, StorageError>;
}

/// Chunk and document persistence. Append-only: no update or delete.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Append a document and its chunks as one atomic unit.
    async fn append_document(
        &self,
        document: TrainingDocument,
        chunks: Vec<Chunk>,
    ) -> Result<(), StorageError>;

    /// All candidates for `agent_id` whose tier is at or below `ceiling`
    /// (inclusive, per the cumulative-access rule), joined with their parent
    /// document's attribution. Observes a single consistent snapshot.
    async fn candidates(
        &self,
        agent_id: &AgentId,
        ceiling: Tier,
    ) -> Result<Vec<Candidate>, StorageError>;

    /// Fetch a document by id (attribution, audits).
    async fn document(&self, id: &DocumentId) -> Result<Option<TrainingDocument>, StorageError>;

    /// Total chunks stored for an agent, across all tiers.
    async fn chunk_count(&self, agent_id: &AgentId) -> Result<usize, StorageError>;
}

/// Grant persistence. One row per (agent_id, viewer_handle).
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Upsert on the unique (agent_id, viewer_handle) key — last write wins.
    /// Must be atomic per key: two concurrent upserts may not interleave
    /// into a corrupted tier value.
    async fn upsert(&self, grant: PermissionGrant) -> Result<(), StorageError>;

    /// Fetch the grant row for (agent_id, viewer_handle), if any.
    async fn get(
        &self,
        agent_id: &AgentId,
        viewer_handle: &str,
    ) -> Result<Option<PermissionGrant>, StorageError>;

    /// All grants for an agent (owner administration views).
    async fn list_for_agent(
        &self,
        agent_id: &AgentId,
    ) -> Result<Vec<PermissionGrant>, StorageError>;
}
