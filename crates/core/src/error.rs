//! Error types for the Confidant domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! `Error` is the taxonomy surfaced by core operations; each bounded
//! context keeps its own sub-enum.
//!
//! Permission shortfalls are deliberately absent: requesting a tier the
//! viewer lacks clamps silently, and a question with no eligible chunks
//! yields an empty context. Neither is an error — an error there would be
//! an oracle for the existence of higher-tier content.

use thiserror::Error;

/// The top-level error type for all Confidant operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or oversized input. Local and user-correctable.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Unknown agent or handle.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// Caller is not the agent's owner for an owner-only mutation.
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// The generation backend exhausted its retries. Transient; the caller
    /// may retry the whole request.
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String },

    // --- Storage errors ---
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    // --- Serialization ---
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable { message: message.into() }
    }
}

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("migration failed: {0}")]
    MigrationFailed(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),
}

/// Errors from the external generation backend.
///
/// `Clone` so retry wrappers can hold the last error while trying again.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("backend not configured: {0}")]
    NotConfigured(String),
}

impl GenerationError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::AuthenticationFailed(_) | Self::NotConfigured(_) => false,
        }
    }
}
