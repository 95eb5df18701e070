//! `confidant ask` — Ask an agent a question as some viewer.

use crate::runtime;
use confidant_config::AppConfig;
use confidant_core::Tier;
use std::str::FromStr;

pub async fn run(
    config: AppConfig,
    agent: &str,
    acting_as: &str,
    tier: Option<String>,
    question: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let requested_tier = match tier {
        Some(raw) => Tier::from_str(&raw)?,
        None => Tier::Public,
    };

    let service = runtime::build_service(&config).await?;
    let outcome = service.ask(agent, acting_as, requested_tier, question).await?;

    println!("{}", outcome.answer);
    println!();
    println!(
        "[effective tier: {} | chunks used: {}]",
        outcome.effective_tier, outcome.chunk_count
    );
    Ok(())
}
