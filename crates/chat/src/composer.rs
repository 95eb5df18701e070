//! Persona composition — persona + chunks + question into one bounded
//! prompt payload.
//!
//! The composer renders exactly the chunk list it is handed, in the order
//! it is handed (the retrieval filter already ranked it). It applies no
//! tier logic of its own, keeping the security boundary singular.
//!
//! # Determinism
//!
//! Composition is deterministic: identical inputs always produce an
//! identical request. No random or time-dependent logic.

use confidant_core::generation::GenerationRequest;
use confidant_core::retrieval::ScoredChunk;
use serde::{Deserialize, Serialize};

/// Character budget for the composed system text.
#[derive(Debug, Clone)]
pub struct PromptBudget {
    /// Maximum characters for persona + knowledge section combined.
    pub max_chars: usize,
}

impl Default for PromptBudget {
    fn default() -> Self {
        Self { max_chars: 24_000 }
    }
}

/// A composed request plus accounting about what made it in.
#[derive(Debug, Clone)]
pub struct Composition {
    pub request: GenerationRequest,
    pub metadata: CompositionMetadata,
}

/// What the composer included and dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionMetadata {
    pub system_chars: usize,
    pub budget_chars: usize,
    pub chunks_included: usize,
    pub chunks_total: usize,
}

/// The persona composer. Stateless — create one and reuse it.
#[derive(Debug, Clone)]
pub struct PersonaComposer {
    budget: PromptBudget,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl PersonaComposer {
    pub fn new(budget: PromptBudget) -> Self {
        Self { budget, temperature: 0.7, max_tokens: Some(1024) }
    }

    pub fn with_default_budget() -> Self {
        Self::new(PromptBudget::default())
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Assemble persona, chunk renderings, and the question into a request.
    ///
    /// The persona and question are always included. Chunks are appended in
    /// the given order while they fit the budget; the rest are dropped and
    /// counted in the metadata. An empty chunk list composes a prompt with
    /// no knowledge section at all.
    pub fn compose(
        &self,
        persona: &str,
        chunks: &[ScoredChunk],
        question: &str,
    ) -> Composition {
        let mut system = String::with_capacity(persona.len() + 256);
        system.push_str("<persona>\n");
        system.push_str(persona.trim());
        system.push_str("\n</persona>\n");

        let mut chunks_included = 0;
        if !chunks.is_empty() {
            let header = "\n[Retrieved Knowledge]\n";
            let mut section = String::new();

            for scored in chunks {
                let entry = format!(
                    "[Source: {}] {}\n",
                    scored.candidate.attribution(),
                    scored.candidate.chunk.text
                );
                let would_be = system.chars().count()
                    + header.chars().count()
                    + section.chars().count()
                    + entry.chars().count();
                if would_be > self.budget.max_chars {
                    break;
                }
                section.push_str(&entry);
                chunks_included += 1;
            }

            if chunks_included > 0 {
                system.push_str(header);
                system.push_str(&section);
            }
        }

        let system_chars = system.chars().count();
        Composition {
            request: GenerationRequest {
                system,
                question: question.to_string(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            },
            metadata: CompositionMetadata {
                system_chars,
                budget_chars: self.budget.max_chars,
                chunks_included,
                chunks_total: chunks.len(),
            },
        }
    }
}
