//! Generation backend implementations for Confidant.
//!
//! - [`OpenAiCompatGenerator`] — any OpenAI-compatible chat-completions
//!   endpoint over HTTP
//! - [`RetryingGenerator`] — per-attempt timeout plus bounded retries with
//!   exponential backoff, wrapped around any inner generator
//! - [`ScriptedGenerator`] — deterministic scripted responses for tests and
//!   offline runs

pub mod mock;
pub mod openai_compat;
pub mod retry;

pub use mock::ScriptedGenerator;
pub use openai_compat::OpenAiCompatGenerator;
pub use retry::RetryingGenerator;
