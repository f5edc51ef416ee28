//! `gm`: the Game Master command line
//!
//! - `gm serve`: chat bridge on `server.port`
//! - `gm tool-host`: tool host on `server.tool_host_port`
//! - `gm chat <text>`: run a single turn and print the reply
//! - `gm tools`: print the tool descriptors advertised to the model

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gm_agent::GameMaster;
use gm_core::{GmConfig, ModelClient, ObservabilityConfig};
use gm_model::create_model;
use gm_server::{ChatState, ToolHostState, chat_router, serve, tool_host_router};
use gm_telemetry::TelemetryOptions;
use gm_tool::builtin::game_master_tools;
use gm_tool::{InMemoryCharacterStore, RemoteToolClient, ToolRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "gm", version, about = "AI Game Master")]
struct Cli {
    /// Path to config.toml (defaults to GM_CONFIG, then the nearest config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the chat bridge
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the tool host with the built-in tools
    ToolHost {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send one message and print the reply
    Chat {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print the tool descriptors as JSON
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    gm_telemetry::init_telemetry(&telemetry_options(&config.observability))
        .context("Failed to initialize telemetry")?;

    let result = match cli.command {
        Command::Serve { port } => run_serve(&config, port).await,
        Command::ToolHost { port } => run_tool_host(&config, port).await,
        Command::Chat { text } => run_chat(&config, &text.join(" ")).await,
        Command::Tools => run_tools(&config).await,
    };

    gm_telemetry::shutdown_telemetry();
    result
}

fn load_config(path: Option<&Path>) -> Result<GmConfig> {
    match path {
        Some(path) => GmConfig::load_from(Some(path)),
        None => GmConfig::load(),
    }
    .context("Failed to load configuration")
}

fn telemetry_options(config: &ObservabilityConfig) -> TelemetryOptions {
    TelemetryOptions {
        service_name: config.service_name.clone(),
        log_level: config.log_level.clone(),
        json: config.log_format == "json",
    }
}

/// Builds the registry the chat side uses: the tool host's tools when a
/// remote URL is configured, otherwise the built-in tools in-process.
async fn build_registry(
    config: &GmConfig,
    lore_delegate: Option<Arc<dyn ModelClient>>,
) -> Result<(Arc<ToolRegistry>, Option<Arc<RemoteToolClient>>)> {
    let mut registry = ToolRegistry::new();

    let remote = match &config.tools.remote_url {
        Some(url) => {
            let token = config
                .tools
                .credentials()
                .resolve()
                .context("Tool host token required when tools.remote_url is set")?
                .token;
            let client = Arc::new(RemoteToolClient::new(
                url.clone(),
                Some(token),
                Duration::from_secs(config.tools.timeout_secs),
            )?);
            let tools = client
                .discover()
                .await
                .with_context(|| format!("Failed to list tools from {}", url))?;
            registry.register_all(tools)?;
            Some(client)
        }
        None => {
            let store = Arc::new(InMemoryCharacterStore::new());
            registry.register_all(game_master_tools(store, lore_delegate)?)?;
            None
        }
    };

    tracing::info!(
        tools = ?registry.names(),
        remote = remote.is_some(),
        "Tool registry ready"
    );
    Ok((Arc::new(registry), remote))
}

async fn build_game_master(config: &GmConfig) -> Result<(GameMaster, Option<Arc<RemoteToolClient>>)> {
    let model = create_model(&config.model).context("Failed to create model client")?;
    let (tools, remote) = build_registry(config, Some(model.clone())).await?;

    let game_master = GameMaster::builder()
        .config(config)
        .model(model)
        .tools(tools)
        .build()?;
    Ok((game_master, remote))
}

async fn run_serve(config: &GmConfig, port: Option<u16>) -> Result<()> {
    let (game_master, remote) = build_game_master(config).await?;

    let mut state = ChatState::new(Arc::new(game_master));
    if let Some(remote) = remote {
        state = state.with_remote(remote);
    }

    let addr = format!("{}:{}", config.server.host, port.unwrap_or(config.server.port));
    serve(chat_router(state), &addr).await
}

async fn run_tool_host(config: &GmConfig, port: Option<u16>) -> Result<()> {
    let token = config
        .tools
        .credentials()
        .resolve()
        .context("The tool host needs a bearer token (tools.auth_token or GM_AUTH_TOKEN)")?
        .token;

    let lore_delegate = match create_model(&config.model) {
        Ok(model) => Some(model),
        Err(e) => {
            tracing::warn!(error = %e, "No model for lore lookups; retrieveLore will fail");
            None
        }
    };

    let mut registry = ToolRegistry::new();
    registry.register_all(game_master_tools(
        Arc::new(InMemoryCharacterStore::new()),
        lore_delegate,
    )?)?;

    let state = ToolHostState::new(Arc::new(registry), token);
    let addr = format!(
        "{}:{}",
        config.server.host,
        port.unwrap_or(config.server.tool_host_port)
    );
    serve(tool_host_router(state), &addr).await
}

async fn run_chat(config: &GmConfig, text: &str) -> Result<()> {
    let (game_master, _) = build_game_master(config).await?;
    let turn = game_master.respond(text).await?;

    for result in &turn.tool_results {
        tracing::debug!(tool = %result.name, result = %result.result_value(), "Tool result");
    }
    println!("{}", turn.reply);
    Ok(())
}

async fn run_tools(config: &GmConfig) -> Result<()> {
    let (registry, _) = build_registry(config, None).await?;
    println!("{}", serde_json::to_string_pretty(&registry.describe_all())?);
    Ok(())
}
