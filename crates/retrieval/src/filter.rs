//! The retrieval filter — selects and ranks chunks a viewer may see.
//!
//! Ordering: relevance score (descending), then document recency (newer
//! document first), then sequence index (ascending). The access ceiling is
//! applied to the candidate set before any scoring runs.

use confidant_core::error::Result;
use confidant_core::retrieval::{RelevanceScorer, ScoredChunk};
use confidant_core::store::ChunkStore;
use confidant_core::{AgentId, Tier};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Stateless retrieval pipeline: fetch candidates under the ceiling, score,
/// rank, truncate. A fresh call re-scans; results are not restartable.
#[derive(Clone)]
pub struct RetrievalFilter {
    store: Arc<dyn ChunkStore>,
    scorer: Arc<dyn RelevanceScorer>,
}

impl RetrievalFilter {
    pub fn new(store: Arc<dyn ChunkStore>, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { store, scorer }
    }

    /// At most `top_k` chunks of `agent_id` relevant to `question`, all at
    /// or below `effective_tier`. No qualifying candidates → empty vec.
    pub async fn retrieve(
        &self,
        agent_id: &AgentId,
        effective_tier: Tier,
        question: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let mut candidates = self.store.candidates(agent_id, effective_tier).await?;
        let fetched = candidates.len();

        // The ceiling is re-applied here, before the scorer sees anything:
        // even a store that ignores its tier bound cannot feed an
        // out-of-ceiling chunk into ranking.
        candidates.retain(|c| c.chunk.tier <= effective_tier);

        let mut scored: Vec<ScoredChunk> = candidates
            .into_iter()
            .map(|candidate| {
                let score = self.scorer.score(question, &candidate.chunk.text);
                ScoredChunk { candidate, score }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    b.candidate
                        .document_created_at
                        .cmp(&a.candidate.document_created_at)
                })
                .then_with(|| a.candidate.chunk.seq.cmp(&b.candidate.chunk.seq))
        });
        scored.truncate(top_k);

        debug!(
            agent_id = %agent_id,
            ceiling = %effective_tier,
            scorer = self.scorer.name(),
            fetched,
            returned = scored.len(),
            "Retrieval complete"
        );

        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::KeywordScorer;
    use confidant_core::document::{Chunk, DocumentId, TrainingDocument};
    use confidant_core::error::StorageError;
    use confidant_core::retrieval::Candidate;
    use confidant_store::InMemoryStore;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    fn agent() -> AgentId {
        AgentId::from("a1")
    }

    async fn seed(store: &InMemoryStore, tier: Tier, texts: &[&str], age_minutes: i64) -> DocumentId {
        let document = TrainingDocument {
            id: DocumentId::new(),
            agent_id: agent(),
            tier,
            title: None,
            source: None,
            content: texts.join(" "),
            content_digest: "digest".into(),
            created_at: Utc::now() - Duration::minutes(age_minutes),
        };
        let id = document.id.clone();
        let chunks = texts
            .iter()
            .enumerate()
            .map(|(seq, text)| Chunk {
                id: format!("{id}-{seq}"),
                document_id: id.clone(),
                agent_id: agent(),
                tier,
                seq,
                text: (*text).to_string(),
            })
            .collect();
        store.append_document(document, chunks).await.unwrap();
        id
    }

    fn filter_over(store: InMemoryStore) -> RetrievalFilter {
        RetrievalFilter::new(Arc::new(store), Arc::new(KeywordScorer))
    }

    #[tokio::test]
    async fn returns_at_most_top_k_highest_first() {
        let store = InMemoryStore::new();
        seed(&store, Tier::Public, &[
            "the secret launch date is March 3rd",
            "launch preparations continue",
            "gardening tips for spring",
        ], 0).await;

        let filter = filter_over(store);
        let results = filter
            .retrieve(&agent(), Tier::Public, "launch date", 2)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert!(results[0].candidate.chunk.text.contains("launch date"));
    }

    #[tokio::test]
    async fn no_over_ceiling_chunk_is_ever_returned() {
        let store = InMemoryStore::new();
        for tier in Tier::ALL {
            seed(&store, tier, &["the launch date question", "more launch talk"], 0).await;
        }
        let filter = filter_over(store);

        // Enumerate every grant × requested-tier combination.
        for granted in Tier::ALL {
            for requested in Tier::ALL {
                let effective = Tier::resolve(granted, requested);
                let results = filter
                    .retrieve(&agent(), effective, "launch date", 100)
                    .await
                    .unwrap();
                assert!(
                    results.iter().all(|r| r.candidate.chunk.tier <= effective),
                    "leak at granted={granted} requested={requested}"
                );
                // Cumulative access: everything at or below is present.
                assert_eq!(results.len(), 2 * (effective.rank() as usize + 1));
            }
        }
    }

    #[tokio::test]
    async fn empty_candidate_set_is_not_an_error() {
        let store = InMemoryStore::new();
        seed(&store, Tier::Intimate, &["a private note"], 0).await;

        let filter = filter_over(store);
        let results = filter
            .retrieve(&agent(), Tier::Public, "private note", 10)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn ties_break_by_recency_then_sequence() {
        let store = InMemoryStore::new();
        // Two documents with identical text; the newer one must rank first.
        let old = seed(&store, Tier::Public, &["same text", "same text"], 60).await;
        let new = seed(&store, Tier::Public, &["same text", "same text"], 0).await;

        let filter = filter_over(store);
        let results = filter
            .retrieve(&agent(), Tier::Public, "same text", 10)
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].candidate.chunk.document_id, new);
        assert_eq!(results[0].candidate.chunk.seq, 0);
        assert_eq!(results[1].candidate.chunk.document_id, new);
        assert_eq!(results[1].candidate.chunk.seq, 1);
        assert_eq!(results[2].candidate.chunk.document_id, old);
    }

    #[tokio::test]
    async fn top_k_zero_returns_nothing() {
        let store = InMemoryStore::new();
        seed(&store, Tier::Public, &["anything"], 0).await;
        let filter = filter_over(store);
        let results = filter.retrieve(&agent(), Tier::Intimate, "anything", 0).await.unwrap();
        assert!(results.is_empty());
    }

    // ── Defense in depth: misbehaving collaborators ────────────────────────

    /// A store that ignores its ceiling argument and returns everything.
    struct LeakyStore {
        all: Vec<Candidate>,
    }

    #[async_trait]
    impl ChunkStore for LeakyStore {
        async fn append_document(
            &self,
            _document: TrainingDocument,
            _chunks: Vec<Chunk>,
        ) -> std::result::Result<(), StorageError> {
            Ok(())
        }

        async fn candidates(
            &self,
            _agent_id: &AgentId,
            _ceiling: Tier,
        ) -> std::result::Result<Vec<Candidate>, StorageError> {
            Ok(self.all.clone())
        }

        async fn document(
            &self,
            _id: &DocumentId,
        ) -> std::result::Result<Option<TrainingDocument>, StorageError> {
            Ok(None)
        }

        async fn chunk_count(&self, _agent_id: &AgentId) -> std::result::Result<usize, StorageError> {
            Ok(self.all.len())
        }
    }

    /// A scorer that records every text it sees and ranks everything top.
    struct RecordingScorer {
        seen: Mutex<Vec<String>>,
    }

    impl RelevanceScorer for RecordingScorer {
        fn name(&self) -> &str {
            "recording"
        }

        fn score(&self, _question: &str, text: &str) -> f32 {
            self.seen.lock().unwrap().push(text.to_string());
            1.0
        }
    }

    fn candidate(tier: Tier, text: &str) -> Candidate {
        Candidate {
            chunk: Chunk {
                id: text.to_string(),
                document_id: DocumentId::from("d1"),
                agent_id: agent(),
                tier,
                seq: 0,
                text: text.to_string(),
            },
            title: None,
            source: None,
            document_created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn out_of_ceiling_chunks_never_reach_the_scorer() {
        let store = LeakyStore {
            all: vec![
                candidate(Tier::Public, "public text"),
                candidate(Tier::Intimate, "the secret launch date is March 3rd"),
            ],
        };
        let scorer = Arc::new(RecordingScorer { seen: Mutex::new(Vec::new()) });
        let filter = RetrievalFilter::new(Arc::new(store), scorer.clone());

        let results = filter
            .retrieve(&agent(), Tier::Public, "launch date", 10)
            .await
            .unwrap();

        // The leaky store's intimate chunk was dropped before scoring...
        let seen = scorer.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), ["public text"]);

        // ...and certainly never returned, no matter how high it would score.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].candidate.chunk.tier, Tier::Public);
    }
}
