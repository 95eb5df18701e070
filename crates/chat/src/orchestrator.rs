//! The chat orchestrator — the per-request pipeline.
//!
//! A linear transformation with no cross-request state:
//!
//! 1. Look up the agent by handle
//! 2. Resolve the viewer's granted ceiling
//! 3. Clamp against the requested tier
//! 4. Retrieve eligible chunks
//! 5. Compose persona + chunks + question
//! 6. Invoke the generation backend
//!
//! Steps 1–5 are cheap and deterministic and are never retried; resilience
//! policy for step 6 lives in the generator (see
//! `confidant-providers::RetryingGenerator`). A failed backend surfaces as
//! `ServiceUnavailable` — retryable by the caller.

use crate::composer::PersonaComposer;
use confidant_core::error::{Error, Result};
use confidant_core::generation::Generator;
use confidant_core::handle;
use confidant_core::store::AgentStore;
use confidant_core::Tier;
use confidant_retrieval::RetrievalFilter;
use confidant_store::Permissions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 5;

/// The answer plus the metadata observability and tests rely on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskOutcome {
    pub answer: String,

    /// The ceiling actually used for retrieval: min(granted, requested).
    pub effective_tier: Tier,

    /// How many chunks were retrieved for composition.
    pub chunk_count: usize,
}

/// Stateless request pipeline; safely shared behind `Arc` by many
/// concurrent callers.
#[derive(Clone)]
pub struct ChatOrchestrator {
    agents: Arc<dyn AgentStore>,
    permissions: Permissions,
    retrieval: RetrievalFilter,
    composer: PersonaComposer,
    generator: Arc<dyn Generator>,
    top_k: usize,
}

impl ChatOrchestrator {
    pub fn new(
        agents: Arc<dyn AgentStore>,
        permissions: Permissions,
        retrieval: RetrievalFilter,
        composer: PersonaComposer,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self { agents, permissions, retrieval, composer, generator, top_k: DEFAULT_TOP_K }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Answer `question` about the agent at `agent_handle`, as seen by
    /// `viewer_handle`, at most at `requested_tier`.
    ///
    /// Requesting a tier above the viewer's grant is not an error — the
    /// ceiling silently narrows. Having no eligible chunks is not an error
    /// either; the persona alone carries the answer.
    pub async fn ask(
        &self,
        agent_handle: &str,
        viewer_handle: &str,
        requested_tier: Tier,
        question: &str,
    ) -> Result<AskOutcome> {
        let agent_handle = handle::required(agent_handle, "agent handle")?;
        if question.trim().is_empty() {
            return Err(Error::validation("question must not be empty"));
        }

        let agent = self
            .agents
            .by_handle(&agent_handle)
            .await?
            .ok_or_else(|| Error::not_found(format!("agent '{agent_handle}'")))?;

        let granted = self.permissions.resolve(&agent, viewer_handle).await?;
        let effective = Tier::resolve(granted, requested_tier);

        let chunks = self
            .retrieval
            .retrieve(&agent.id, effective, question, self.top_k)
            .await?;
        let chunk_count = chunks.len();

        let composition = self.composer.compose(&agent.persona, &chunks, question);

        let response = self
            .generator
            .generate(composition.request)
            .await
            .map_err(|e| Error::service_unavailable(format!("generation backend failed: {e}")))?;

        info!(
            agent = %agent.handle,
            effective_tier = %effective,
            chunk_count,
            chunks_composed = composition.metadata.chunks_included,
            answer_chars = response.text.len(),
            "Question answered"
        );

        Ok(AskOutcome { answer: response.text, effective_tier: effective, chunk_count })
    }
}
