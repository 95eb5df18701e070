//! `confidant agent` / `confidant persona` — Agent management commands.

use crate::runtime;
use confidant_config::AppConfig;
use std::path::PathBuf;

pub async fn create(
    config: AppConfig,
    handle: &str,
    acting_as: &str,
    persona: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = runtime::build_service(&config).await?;
    let summary = service.create_agent(handle, acting_as, persona).await?;

    println!("Created agent '{}' (owner: {})", summary.handle, summary.owner_handle);
    Ok(())
}

pub async fn show(
    config: AppConfig,
    handle: &str,
    acting_as: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = runtime::build_service(&config).await?;
    let summary = service.lookup_agent(handle, acting_as).await?;

    println!("Agent:   {}", summary.handle);
    println!("Owner:   {}", summary.owner_handle);
    println!("Created: {}", summary.created_at.format("%Y-%m-%d %H:%M UTC"));
    match summary.persona {
        Some(persona) => {
            println!("Persona ({} chars):", persona.chars().count());
            println!("{persona}");
        }
        None => println!("Persona: (visible to the owner only)"),
    }
    Ok(())
}

pub async fn update_persona(
    config: AppConfig,
    agent: &str,
    acting_as: &str,
    text: Option<String>,
    file: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let persona = read_text_arg(text, file, "persona")?;
    let service = runtime::build_service(&config).await?;
    let summary = service.update_persona(agent, acting_as, &persona).await?;

    println!(
        "Persona for '{}' updated ({} chars)",
        summary.handle,
        summary.persona.map(|p| p.chars().count()).unwrap_or(0)
    );
    Ok(())
}

/// Resolve a `--text` / `--file` argument pair into content.
pub fn read_text_arg(
    text: Option<String>,
    file: Option<PathBuf>,
    what: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => Ok(std::fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {what} from {}: {e}", path.display()))?),
        (None, None) => Err(format!("provide {what} via --text or --file").into()),
    }
}
