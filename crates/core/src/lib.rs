//! # Confidant Core
//!
//! Domain types, traits, and error definitions for Confidant — a
//! permission-gated persona-chat engine. Each agent holds a knowledge corpus
//! split across three ordered confidentiality tiers; viewers hold per-agent
//! maximum-tier grants; answers are composed only from chunks at or below
//! the viewer's effective ceiling.
//!
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod agent;
pub mod document;
pub mod error;
pub mod generation;
pub mod grant;
pub mod handle;
pub mod retrieval;
pub mod store;
pub mod tier;

// Re-export key types at crate root for ergonomics
pub use agent::{Agent, AgentId, AgentSummary, PERSONA_MAX_CHARS};
pub use document::{Chunk, DocumentId, IngestReceipt, TrainingDocument};
pub use error::{Error, GenerationError, Result, StorageError};
pub use generation::{GenerationRequest, GenerationResponse, Generator, Usage};
pub use grant::PermissionGrant;
pub use retrieval::{Candidate, RelevanceScorer, ScoredChunk};
pub use store::{AgentStore, ChunkStore, GrantStore};
pub use tier::Tier;
