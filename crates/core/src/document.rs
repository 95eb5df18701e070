//! Training documents and their tier-tagged chunks.
//!
//! Documents are append-only: ingestion never mutates prior documents, and
//! there is no update or delete path. Every chunk copies its tier from the
//! parent document at creation and is never re-tagged independently.

use crate::agent::AgentId;
use crate::tier::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a training document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of ingested training text, tagged with one confidentiality tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingDocument {
    pub id: DocumentId,
    pub agent_id: AgentId,

    /// Confidentiality tier. Every chunk of this document inherits it.
    pub tier: Tier,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Where the text came from (URL, filename, conversation, …)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub content: String,

    /// Hex SHA-256 of `content`. Recorded for audit; re-ingesting identical
    /// content still appends a fresh document.
    pub content_digest: String,

    pub created_at: DateTime<Utc>,
}

/// An immutable, tier-tagged fragment of a training document — the unit of
/// retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: DocumentId,
    pub agent_id: AgentId,

    /// Copied from the parent document at creation; immutable thereafter.
    pub tier: Tier,

    /// Sequence index, contiguous from 0 within the document.
    pub seq: usize,

    pub text: String,
}

/// What an ingestion call reports back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub document_id: DocumentId,
    pub tier: Tier,
    pub chunk_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_serialization_skips_empty_optionals() {
        let doc = TrainingDocument {
            id: DocumentId::from("d1"),
            agent_id: AgentId::from("a1"),
            tier: Tier::Friends,
            title: None,
            source: None,
            content: "hello".into(),
            content_digest: "abc".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("title"));
        assert!(!json.contains("source"));
        assert!(json.contains("\"friends\""));
    }

    #[test]
    fn chunk_roundtrip() {
        let chunk = Chunk {
            id: "c1".into(),
            document_id: DocumentId::from("d1"),
            agent_id: AgentId::from("a1"),
            tier: Tier::Intimate,
            seq: 3,
            text: "a fragment".into(),
        };
        let json = serde_json::to_string(&chunk).unwrap();
        let back: Chunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seq, 3);
        assert_eq!(back.tier, Tier::Intimate);
    }
}
