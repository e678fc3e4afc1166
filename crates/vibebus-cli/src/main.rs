//! Vibebus CLI - chat with a Helsinki weather and transit assistant
//!
//! Loads `.env` and the TOML config, then runs a line-based chat session
//! against the orchestrator from vibebus-core.

mod repl;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use vibebus_core::config::{Config, ConfigManager};
use vibebus_core::orchestration::{create_standard_tool_registry, Orchestrator, SystemPrompt};
use vibebus_core::provider::GenAIProvider;
use vibebus_core::session::SessionContext;

#[derive(Parser)]
#[command(name = "vibebus")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Weather, bus departures and stop search for Helsinki, via an LLM", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Model to use (overrides DEFAULT_MODEL and the config file)
    #[arg(short, long)]
    model: Option<String>,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Send a single message, print the reply and exit
    #[arg(long)]
    one_shot: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat mode
    Chat,

    /// Show available tools
    Tools,

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment variables win
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Keep the prompt clean unless asked for more; RUST_LOG still wins
    let default_filter = if cli.verbose {
        "info,vibebus_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, config_path) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}: {}", style("Configuration Error").red().bold(), e);
            std::process::exit(1);
        }
    };

    match &cli.command {
        Some(Commands::Tools) => show_tools(&config)?,
        Some(Commands::Config) => show_config(&config_path, &config)?,
        Some(Commands::Chat) | None => {
            let orchestrator = match build_orchestrator(&config) {
                Ok(orchestrator) => orchestrator,
                Err(e) => {
                    eprintln!("{}: {}", style("Configuration Error").red().bold(), e);
                    eprintln!(
                        "Set {} in your environment or in a .env file.",
                        config.llm.api_key_env
                    );
                    std::process::exit(1);
                }
            };
            let session = new_session(&config);

            match cli.one_shot.as_deref() {
                Some(prompt) => repl::run_one_shot(&orchestrator, session, prompt).await,
                None => repl::run_chat(&orchestrator, session).await?,
            }
        }
    }

    Ok(())
}

/// File (or defaults), then environment, then command-line flags
fn load_config(cli: &Cli) -> anyhow::Result<(Config, PathBuf)> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone())?,
        None => ConfigManager::new()?,
    };
    let path = manager.config_path().to_path_buf();
    let mut config = manager.into_config();
    config.apply_env_overrides(|key| std::env::var(key).ok());
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    config.validate()?;
    Ok((config, path))
}

fn build_orchestrator(config: &Config) -> anyhow::Result<Orchestrator> {
    let provider = GenAIProvider::from_config(&config.llm)?;
    let registry = create_standard_tool_registry(config)?;
    Ok(Orchestrator::new(Arc::new(provider), registry))
}

fn new_session(config: &Config) -> SessionContext {
    let prompt = SystemPrompt::from_settings(config.session.system_prompt.as_deref())
        .with_default_stop(&config.transit.default_stop_id)
        .build();
    SessionContext::new(prompt, config.session.max_messages)
}

fn show_tools(config: &Config) -> anyhow::Result<()> {
    let registry = create_standard_tool_registry(config)?;

    println!("{}", style("Available Tools:").bold());
    println!();
    for def in registry.list() {
        println!("  {}", style(&def.name).cyan());
        println!("    {}", def.description);

        let required: Vec<&str> = def.parameters["required"]
            .as_array()
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();
        if let Some(props) = def.parameters["properties"].as_object() {
            for (name, schema) in props {
                let flag = if required.contains(&name.as_str()) {
                    style("required").yellow()
                } else {
                    style("optional").dim()
                };
                println!(
                    "    - {} ({}, {}): {}",
                    name,
                    schema["type"].as_str().unwrap_or("any"),
                    flag,
                    schema["description"].as_str().unwrap_or("")
                );
            }
        }
        println!();
    }
    Ok(())
}

fn show_config(path: &Path, config: &Config) -> anyhow::Result<()> {
    let key_status = |present: bool| {
        if present {
            style("set").green()
        } else {
            style("missing").red()
        }
    };

    println!("{}", style("Configuration:").bold());
    println!();
    println!(
        "  Config file: {} {}",
        style(path.display()).green(),
        if path.exists() { "" } else { "(not found, using defaults)" }
    );
    println!(
        "  {}: {}",
        config.llm.api_key_env,
        key_status(config.llm.api_key().is_some())
    );
    println!(
        "  {}: {}",
        config.transit.api_key_env,
        key_status(config.transit.api_key().is_some())
    );
    println!();

    // Never echo keys stored in the file
    let mut shown = config.clone();
    if shown.llm.api_key.is_some() {
        shown.llm.api_key = Some("********".to_string());
    }
    if shown.transit.api_key.is_some() {
        shown.transit.api_key = Some("********".to_string());
    }
    println!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}
