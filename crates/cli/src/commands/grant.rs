//! `confidant grant` — Upsert or list per-viewer tier grants.

use crate::runtime;
use confidant_config::AppConfig;
use confidant_core::Tier;
use std::str::FromStr;

pub async fn run(
    config: AppConfig,
    agent: &str,
    acting_as: &str,
    viewer: Option<String>,
    tier: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = runtime::build_service(&config).await?;

    match (viewer, tier) {
        (Some(viewer), Some(tier)) => {
            let max_tier = Tier::from_str(&tier)?;
            service.set_grant(agent, acting_as, &viewer, max_tier).await?;
            println!("Granted '{viewer}' access up to '{max_tier}' on '{agent}'");
        }
        (None, None) => {
            let grants = service.list_grants(agent, acting_as).await?;
            if grants.is_empty() {
                println!("No grants stored for '{agent}' (everyone resolves to 'public')");
            } else {
                println!("Grants for '{agent}':");
                for grant in grants {
                    println!("  {:10} → {}", grant.viewer_handle, grant.max_tier);
                }
            }
        }
        _ => return Err("provide both VIEWER and TIER to set a grant, or neither to list".into()),
    }
    Ok(())
}
