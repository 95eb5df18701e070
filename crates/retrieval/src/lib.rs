//! Retrieval for Confidant — ceiling-bounded candidate selection, pluggable
//! relevance scoring, deterministic ranking.
//!
//! Tier enforcement happens here and only here: the filter drops
//! out-of-ceiling candidates *before* any scoring runs, so a ranking bug
//! can never surface higher-tier content. Downstream composition trusts
//! the filter's output completely.

pub mod filter;
pub mod keyword;

pub use filter::RetrievalFilter;
pub use keyword::KeywordScorer;
