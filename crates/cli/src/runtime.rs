//! Builds the application service from configuration.
//!
//! All wiring lives here so every CLI command and the gateway share the
//! same construction path: store backend → permission layer → retrieval →
//! composer → generation backend (with retry policy) → service.

use confidant_chat::{ChatOrchestrator, ConfidantService, PersonaComposer, PromptBudget};
use confidant_config::AppConfig;
use confidant_core::generation::Generator;
use confidant_core::store::{AgentStore, ChunkStore, GrantStore};
use confidant_ingest::Ingestor;
use confidant_providers::{OpenAiCompatGenerator, RetryingGenerator, ScriptedGenerator};
use confidant_retrieval::{KeywordScorer, RetrievalFilter};
use confidant_store::{InMemoryStore, Permissions, SqliteStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

struct Stores {
    agents: Arc<dyn AgentStore>,
    chunks: Arc<dyn ChunkStore>,
    grants: Arc<dyn GrantStore>,
}

async fn build_stores(config: &AppConfig) -> Result<Stores, Box<dyn std::error::Error>> {
    match config.store.backend.as_str() {
        "memory" => {
            let store = InMemoryStore::new();
            Ok(Stores {
                agents: Arc::new(store.clone()),
                chunks: Arc::new(store.clone()),
                grants: Arc::new(store),
            })
        }
        _ => {
            let store = SqliteStore::new(&config.store.path).await?;
            Ok(Stores {
                agents: Arc::new(store.clone()),
                chunks: Arc::new(store.clone()),
                grants: Arc::new(store),
            })
        }
    }
}

fn build_generator(config: &AppConfig) -> Arc<dyn Generator> {
    match config.generation.backend.as_str() {
        "scripted" => Arc::new(ScriptedGenerator::parroting()),
        _ => {
            let api_key = config.generation.api_key.clone().unwrap_or_default();
            let mut backend = OpenAiCompatGenerator::new(api_key, config.generation.model.clone());
            if let Some(url) = &config.generation.api_url {
                backend = backend.with_base_url(url.clone());
            }
            Arc::new(
                RetryingGenerator::new(Arc::new(backend))
                    .with_max_retries(config.generation.max_retries)
                    .with_attempt_timeout(Duration::from_secs(config.generation.timeout_secs)),
            )
        }
    }
}

/// Build the full application service from configuration.
pub async fn build_service(
    config: &AppConfig,
) -> Result<ConfidantService, Box<dyn std::error::Error>> {
    let stores = build_stores(config).await?;
    let permissions = Permissions::new(stores.grants);
    let generator = build_generator(config);

    let composer = PersonaComposer::new(PromptBudget {
        max_chars: config.retrieval.prompt_budget_chars,
    })
    .with_temperature(config.generation.temperature)
    .with_max_tokens(Some(config.generation.max_tokens));

    let orchestrator = ChatOrchestrator::new(
        stores.agents.clone(),
        permissions.clone(),
        RetrievalFilter::new(stores.chunks.clone(), Arc::new(KeywordScorer)),
        composer,
        generator,
    )
    .with_top_k(config.retrieval.top_k);

    Ok(ConfidantService::new(
        stores.agents,
        permissions,
        Arc::new(Ingestor::new(stores.chunks)),
        orchestrator,
    ))
}
