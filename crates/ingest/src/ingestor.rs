//! Ingestion service — raw text in, tier-tagged chunks out.

use crate::chunker::Chunker;
use confidant_core::document::{Chunk, DocumentId, IngestReceipt, TrainingDocument};
use confidant_core::error::{Error, Result};
use confidant_core::store::ChunkStore;
use confidant_core::{AgentId, Tier};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Turns raw training text into a stored document plus chunks.
///
/// Append-only and non-deduplicating: re-ingesting identical content
/// produces a fresh document with its own chunk set. The document's
/// SHA-256 content digest is recorded so a later dedup/versioning pass has
/// the data without a schema change.
pub struct Ingestor {
    store: Arc<dyn ChunkStore>,
    chunker: Chunker,
}

impl Ingestor {
    pub fn new(store: Arc<dyn ChunkStore>) -> Self {
        Self { store, chunker: Chunker::default() }
    }

    /// Use a non-default chunker (tests, tuning).
    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Ingest one document for `agent_id` at `tier`.
    ///
    /// Fails with a validation error if `content` is empty after trimming.
    /// Every produced chunk inherits the document's tier and agent id;
    /// sequence indices are contiguous from 0.
    pub async fn ingest(
        &self,
        agent_id: &AgentId,
        tier: Tier,
        title: Option<String>,
        source: Option<String>,
        content: &str,
    ) -> Result<IngestReceipt> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::validation("document content must not be empty"));
        }

        let document_id = DocumentId::new();
        let content_digest = format!("{:x}", Sha256::digest(content.as_bytes()));

        let document = TrainingDocument {
            id: document_id.clone(),
            agent_id: agent_id.clone(),
            tier,
            title,
            source,
            content: content.to_string(),
            content_digest,
            created_at: Utc::now(),
        };

        let chunks: Vec<Chunk> = self
            .chunker
            .split(content)
            .into_iter()
            .enumerate()
            .map(|(seq, text)| Chunk {
                id: Uuid::new_v4().to_string(),
                document_id: document_id.clone(),
                agent_id: agent_id.clone(),
                tier,
                seq,
                text,
            })
            .collect();

        let chunk_count = chunks.len();
        self.store.append_document(document, chunks).await?;

        info!(
            agent_id = %agent_id,
            document_id = %document_id,
            tier = %tier,
            chunk_count,
            content_chars = content.chars().count(),
            "Document ingested"
        );

        Ok(IngestReceipt { document_id, tier, chunk_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confidant_core::error::StorageError;
    use confidant_core::retrieval::Candidate;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Captures appended documents for assertions.
    struct CapturingStore {
        appended: Mutex<Vec<(TrainingDocument, Vec<Chunk>)>>,
    }

    impl CapturingStore {
        fn new() -> Arc<Self> {
            Arc::new(Self { appended: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl ChunkStore for CapturingStore {
        async fn append_document(
            &self,
            document: TrainingDocument,
            chunks: Vec<Chunk>,
        ) -> std::result::Result<(), StorageError> {
            self.appended.lock().await.push((document, chunks));
            Ok(())
        }

        async fn candidates(
            &self,
            _agent_id: &AgentId,
            _ceiling: Tier,
        ) -> std::result::Result<Vec<Candidate>, StorageError> {
            Ok(Vec::new())
        }

        async fn document(
            &self,
            _id: &DocumentId,
        ) -> std::result::Result<Option<TrainingDocument>, StorageError> {
            Ok(None)
        }

        async fn chunk_count(&self, _agent_id: &AgentId) -> std::result::Result<usize, StorageError> {
            Ok(0)
        }
    }

    fn agent() -> AgentId {
        AgentId::from("agent-1")
    }

    #[tokio::test]
    async fn empty_content_is_a_validation_error() {
        let ingestor = Ingestor::new(CapturingStore::new());
        let err = ingestor
            .ingest(&agent(), Tier::Public, None, None, "   \n\t  ")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn chunks_inherit_tier_and_agent_with_contiguous_indices() {
        let store = CapturingStore::new();
        let ingestor = Ingestor::new(store.clone())
            .with_chunker(Chunker::new(10, 3).unwrap());

        let receipt = ingestor
            .ingest(
                &agent(),
                Tier::Friends,
                Some("Notes".into()),
                None,
                "abcdefghijklmnopqrstuvwxyz",
            )
            .await
            .unwrap();

        let appended = store.appended.lock().await;
        let (document, chunks) = &appended[0];

        assert_eq!(document.tier, Tier::Friends);
        assert_eq!(receipt.chunk_count, chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.seq, i);
            assert_eq!(chunk.tier, document.tier);
            assert_eq!(chunk.agent_id, document.agent_id);
            assert_eq!(chunk.document_id, document.id);
        }
    }

    #[tokio::test]
    async fn reingesting_identical_content_is_deterministic_not_deduplicated() {
        let store = CapturingStore::new();
        let ingestor = Ingestor::new(store.clone());
        let content = "Luna keeps a garden of night-blooming jasmine. ".repeat(60);

        let first = ingestor
            .ingest(&agent(), Tier::Public, None, None, &content)
            .await
            .unwrap();
        let second = ingestor
            .ingest(&agent(), Tier::Public, None, None, &content)
            .await
            .unwrap();

        // Two independent documents...
        assert_ne!(first.document_id, second.document_id);

        // ...with identical chunk counts and identical per-chunk text.
        assert_eq!(first.chunk_count, second.chunk_count);
        let appended = store.appended.lock().await;
        let texts_a: Vec<&str> = appended[0].1.iter().map(|c| c.text.as_str()).collect();
        let texts_b: Vec<&str> = appended[1].1.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts_a, texts_b);

        // Same content, same digest.
        assert_eq!(appended[0].0.content_digest, appended[1].0.content_digest);
    }

    #[tokio::test]
    async fn receipt_reports_tier_and_count() {
        let ingestor = Ingestor::new(CapturingStore::new());
        let receipt = ingestor
            .ingest(&agent(), Tier::Intimate, None, Some("diary.txt".into()), "a short secret")
            .await
            .unwrap();
        assert_eq!(receipt.tier, Tier::Intimate);
        assert_eq!(receipt.chunk_count, 1);
    }
}
