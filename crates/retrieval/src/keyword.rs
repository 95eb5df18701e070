//! Keyword-overlap relevance scorer — the default scorer.
//!
//! Scores by the fraction of question terms present in the chunk, plus an
//! occurrence-density bonus normalized by chunk length. Pure and
//! deterministic; embedding-based scorers can be swapped in behind the same
//! trait.

use confidant_core::retrieval::RelevanceScorer;

pub struct KeywordScorer;

impl KeywordScorer {
    /// Question terms: lowercased alphanumeric runs of at least 2 chars.
    fn terms(question: &str) -> Vec<String> {
        let mut terms: Vec<String> = question
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() >= 2)
            .map(str::to_string)
            .collect();
        terms.sort();
        terms.dedup();
        terms
    }
}

impl RelevanceScorer for KeywordScorer {
    fn name(&self) -> &str {
        "keyword"
    }

    fn score(&self, question: &str, text: &str) -> f32 {
        let terms = Self::terms(question);
        if terms.is_empty() {
            return 0.0;
        }

        let text_lower = text.to_lowercase();
        let matched = terms.iter().filter(|t| text_lower.contains(t.as_str())).count();
        if matched == 0 {
            return 0.0;
        }

        let coverage = matched as f32 / terms.len() as f32;
        let occurrences: usize = terms
            .iter()
            .map(|t| text_lower.matches(t.as_str()).count())
            .sum();
        let density =
            occurrences as f32 / (text_lower.chars().count() as f32 / 100.0).max(1.0);

        coverage + density.min(1.0)
    }
}
