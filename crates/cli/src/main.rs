//! Confidant CLI — the main entry point.
//!
//! Commands:
//! - `serve`   — Start the HTTP gateway
//! - `agent`   — Create or inspect agents
//! - `persona` — Replace an agent's persona
//! - `ingest`  — Ingest a training document at a tier
//! - `grant`   — Upsert or list per-viewer tier grants
//! - `ask`     — Ask an agent a question as some viewer

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod runtime;

#[derive(Parser)]
#[command(
    name = "confidant",
    about = "Confidant — permission-gated persona-chat agents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.confidant/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create or inspect agents
    Agent {
        #[command(subcommand)]
        command: AgentCommands,
    },

    /// Replace an agent's persona (owner only)
    Persona {
        /// Agent handle
        agent: String,

        /// Acting user's handle
        #[arg(long = "as", value_name = "HANDLE")]
        acting_as: String,

        /// Persona text; use --file to read from disk instead
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read persona text from this file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Ingest a training document at a confidentiality tier (owner only)
    Ingest {
        /// Agent handle
        agent: String,

        /// Acting user's handle
        #[arg(long = "as", value_name = "HANDLE")]
        acting_as: String,

        /// Tier: public, friends, or intimate
        #[arg(long)]
        tier: String,

        /// Document text; use --file to read from disk instead
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read document text from this file
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        source: Option<String>,
    },

    /// Upsert a viewer's maximum tier (owner only)
    Grant {
        /// Agent handle
        agent: String,

        /// Acting user's handle
        #[arg(long = "as", value_name = "HANDLE")]
        acting_as: String,

        /// Viewer handle to grant; omit to list existing grants
        viewer: Option<String>,

        /// Tier: public, friends, or intimate
        tier: Option<String>,
    },

    /// Ask an agent a question
    Ask {
        /// Agent handle
        agent: String,

        /// Acting user's handle
        #[arg(long = "as", value_name = "HANDLE")]
        acting_as: String,

        /// Requested tier (defaults to public)
        #[arg(long)]
        tier: Option<String>,

        /// The question
        question: String,
    },
}

#[derive(Subcommand)]
enum AgentCommands {
    /// Create a new agent owned by --as
    Create {
        /// Agent handle
        handle: String,

        /// Acting user's handle (becomes the owner)
        #[arg(long = "as", value_name = "HANDLE")]
        acting_as: String,

        /// Initial persona text
        #[arg(long, default_value = "")]
        persona: String,
    },

    /// Show an agent as seen by --as
    Show {
        /// Agent handle
        handle: String,

        /// Acting user's handle
        #[arg(long = "as", value_name = "HANDLE")]
        acting_as: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = runtime::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::Agent { command } => match command {
            AgentCommands::Create { handle, acting_as, persona } => {
                commands::agent::create(config, &handle, &acting_as, &persona).await?
            }
            AgentCommands::Show { handle, acting_as } => {
                commands::agent::show(config, &handle, &acting_as).await?
            }
        },
        Commands::Persona { agent, acting_as, text, file } => {
            commands::agent::update_persona(config, &agent, &acting_as, text, file).await?
        }
        Commands::Ingest { agent, acting_as, tier, text, file, title, source } => {
            commands::ingest::run(config, &agent, &acting_as, &tier, text, file, title, source)
                .await?
        }
        Commands::Grant { agent, acting_as, viewer, tier } => {
            commands::grant::run(config, &agent, &acting_as, viewer, tier).await?
        }
        Commands::Ask { agent, acting_as, tier, question } => {
            commands::ask::run(config, &agent, &acting_as, tier, &question).await?
        }
    }

    Ok(())
}
