//! Configuration loading, validation, and management for Confidant.
//!
//! Loads configuration from `~/.confidant/config.toml` (or an explicit
//! path) with environment variable overrides. Validates all settings at
//! startup. Missing file means defaults — a scripted backend and an
//! in-memory store, enough to run locally with zero setup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("failed to parse config at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// The root configuration structure.
///
/// Maps directly to `~/.confidant/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation backend settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Retrieval tuning
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Gateway bind settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("generation", &self.generation)
            .field("store", &self.store)
            .field("retrieval", &self.retrieval)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// "openai_compat" or "scripted" (offline echo backend)
    #[serde(default = "default_backend")]
    pub backend: String,

    /// API key for the HTTP backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override (proxies, self-hosted servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-attempt timeout for the generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt on transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("backend", &self.backend)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

fn default_backend() -> String {
    "openai_compat".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            api_key: None,
            api_url: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "sqlite" or "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_store_backend() -> String {
    "sqlite".into()
}
fn default_db_path() -> String {
    "confidant.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: default_store_backend(), path: default_db_path() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Character budget for the composed system text
    #[serde(default = "default_prompt_budget")]
    pub prompt_budget_chars: usize,
}

fn default_top_k() -> usize {
    5
}
fn default_prompt_budget() -> usize {
    24_000
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: default_top_k(), prompt_budget_chars: default_prompt_budget() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8787
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.confidant/config.toml).
    ///
    /// Environment variable overrides (highest priority):
    /// - `CONFIDANT_API_KEY` (falls back to `OPENAI_API_KEY`)
    /// - `CONFIDANT_API_URL`
    /// - `CONFIDANT_MODEL`
    /// - `CONFIDANT_DB_PATH`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file path, then apply env
    /// overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        if config.generation.api_key.is_none() {
            config.generation.api_key = std::env::var("CONFIDANT_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }
        if let Ok(url) = std::env::var("CONFIDANT_API_URL") {
            config.generation.api_url = Some(url);
        }
        if let Ok(model) = std::env::var("CONFIDANT_MODEL") {
            config.generation.model = model;
        }
        if let Ok(db_path) = std::env::var("CONFIDANT_DB_PATH") {
            config.store.path = db_path;
        }

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".confidant")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        match self.generation.backend.as_str() {
            "openai_compat" | "scripted" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown generation backend '{other}' (expected openai_compat or scripted)"
                )));
            }
        }
        match self.store.backend.as_str() {
            "sqlite" | "memory" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown store backend '{other}' (expected sqlite or memory)"
                )));
            }
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError("retrieval.top_k must be positive".into()));
        }
        Ok(())
    }

    /// Generate a default config TOML string (for first-run setup).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            store: StoreConfig::default(),
            retrieval: RetrievalConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

fn dirs_home() -> PathBuf {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.store.backend, "sqlite");
    }

    #[test]
    fn toml_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.generation.model, config.generation.model);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [generation]
            backend = "scripted"

            [retrieval]
            top_k = 3
            "#,
        )
        .unwrap();
        assert_eq!(parsed.generation.backend, "scripted");
        assert_eq!(parsed.retrieval.top_k, 3);
        assert_eq!(parsed.store.backend, "sqlite");
        assert_eq!(parsed.generation.timeout_secs, 30);
    }

    #[test]
    fn bad_backend_rejected() {
        let config: AppConfig = toml::from_str(
            r#"
            [generation]
            backend = "carrier-pigeon"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn api_key_redacted_in_debug() {
        let mut config = AppConfig::default();
        config.generation.api_key = Some("sk-very-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/confidant.toml")).unwrap();
        assert_eq!(config.gateway.port, 8787);
    }

    #[test]
    fn load_from_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [store]
            backend = "memory"

            [gateway]
            port = 9000
            "#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.store.backend, "memory");
        assert_eq!(config.gateway.port, 9000);
    }

    #[test]
    fn parse_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
