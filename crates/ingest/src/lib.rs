//! Document ingestion for Confidant.
//!
//! Raw training text becomes a [`TrainingDocument`] plus a set of
//! tier-tagged [`Chunk`]s: the chunker splits content into fixed-size
//! windows with adjacent overlap, every chunk inherits the document's tier
//! and agent id, and the whole unit is appended to the store atomically.
//!
//! [`TrainingDocument`]: confidant_core::TrainingDocument
//! [`Chunk`]: confidant_core::Chunk

pub mod chunker;
pub mod ingestor;

pub use chunker::Chunker;
pub use ingestor::Ingestor;
