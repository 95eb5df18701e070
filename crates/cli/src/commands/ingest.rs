//! `confidant ingest` — Ingest a training document at a tier.

use crate::commands::agent::read_text_arg;
use crate::runtime;
use confidant_config::AppConfig;
use confidant_core::Tier;
use std::path::PathBuf;
use std::str::FromStr;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    config: AppConfig,
    agent: &str,
    acting_as: &str,
    tier: &str,
    text: Option<String>,
    file: Option<PathBuf>,
    title: Option<String>,
    source: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tier = Tier::from_str(tier)?;
    let content = read_text_arg(text, file, "document content")?;

    let service = runtime::build_service(&config).await?;
    let receipt = service
        .ingest_document(agent, acting_as, tier, title, source, &content)
        .await?;

    println!(
        "Ingested document {} at tier '{}' ({} chunks)",
        receipt.document_id, receipt.tier, receipt.chunk_count
    );
    Ok(())
}
