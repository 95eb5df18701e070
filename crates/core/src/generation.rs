//! Generator trait — the abstraction over the external generation backend.
//!
//! The core hands the backend a bounded prompt and receives text back. The
//! generation call is the only operation in the request pipeline expected to
//! suspend on network I/O; timeout and retry policy live in wrapper
//! implementations, not here.

use crate::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A bounded prompt payload for the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// System text: persona plus the rendered knowledge section.
    pub system: String,

    /// The viewer's question.
    pub question: String,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete response from the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated answer text.
    pub text: String,

    /// Which model actually responded.
    pub model: String,

    /// Token usage statistics, if the backend reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Generator trait.
///
/// Every backend (OpenAI-compatible HTTP, scripted mock, retrying wrapper)
/// implements this trait. The orchestrator calls `generate()` without
/// knowing which backend is in use.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai_compat").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let json = r#"{"system": "You are Luna.", "question": "hello?"}"#;
        let req: GenerationRequest = serde_json::from_str(json).unwrap();
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(req.max_tokens.is_none());
    }

    #[test]
    fn response_roundtrip() {
        let resp = GenerationResponse {
            text: "An answer.".into(),
            model: "test-model".into(),
            usage: Some(Usage { prompt_tokens: 12, completion_tokens: 3, total_tokens: 15 }),
        };
        let json = serde_json::to_string(&resp).unwrap();
        let back: GenerationResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text, "An answer.");
        assert_eq!(back.usage.unwrap().total_tokens, 15);
    }
}
