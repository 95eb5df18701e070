//! Retrieval value objects and the pluggable relevance-scorer seam.
//!
//! Scoring is an injected capability so the access-ceiling filter can be
//! tested independently of whatever scoring algorithm (keyword overlap,
//! embedding similarity) is in use. Scoring only ever sees chunks that have
//! already passed the tier filter.

use crate::document::Chunk;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chunk eligible for retrieval, joined with its parent document's
/// attribution and recency. Produced by stores, consumed by the filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub chunk: Chunk,

    /// Parent document title, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Parent document source, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Parent document creation time — the recency tie-breaker.
    pub document_created_at: DateTime<Utc>,
}

impl Candidate {
    /// Attribution label for prompt rendering: source, else title, else the
    /// parent document id.
    pub fn attribution(&self) -> String {
        self.source
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| self.chunk.document_id.to_string())
    }
}

/// A candidate that survived filtering and scoring, ready for composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub candidate: Candidate,

    /// Relevance score from the injected scorer. Higher is more relevant.
    pub score: f32,
}

/// Scores a chunk's relevance to a question.
///
/// Implementations must be pure: the same (question, text) pair always
/// yields the same score, so retrieval stays deterministic.
pub trait RelevanceScorer: Send + Sync {
    /// A human-readable name for this scorer (e.g., "keyword").
    fn name(&self) -> &str;

    /// Relevance of `text` to `question`. Higher is more relevant.
    fn score(&self, question: &str, text: &str) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;
    use crate::document::DocumentId;
    use crate::tier::Tier;

    fn candidate(title: Option<&str>, source: Option<&str>) -> Candidate {
        Candidate {
            chunk: Chunk {
                id: "c1".into(),
                document_id: DocumentId::from("doc-77"),
                agent_id: AgentId::from("a1"),
                tier: Tier::Public,
                seq: 0,
                text: "text".into(),
            },
            title: title.map(Into::into),
            source: source.map(Into::into),
            document_created_at: Utc::now(),
        }
    }

    #[test]
    fn attribution_prefers_source_then_title_then_id() {
        assert_eq!(
            candidate(Some("My Title"), Some("notes.md")).attribution(),
            "notes.md"
        );
        assert_eq!(candidate(Some("My Title"), None).attribution(), "My Title");
        assert_eq!(candidate(None, None).attribution(), "doc-77");
    }
}
