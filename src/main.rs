//! Pictionary - Unified CLI
//!
//! Game server, terminal client and catalog listing.

#![warn(missing_docs)]

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use pictionary::{
    AppConfig, AppState, DrawingProvider, GAME_WORDS, GameEngine, GameRepository, GameStore,
    LlmClient, LlmDrawingProvider, MemoryGameStore, PlaceholderDrawing, category_of,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Database URL selecting the process-local store.
const IN_MEMORY_URL: &str = ":memory:";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pictionary=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            database_url,
        } => run_server(config, host, port, database_url).await,
        Command::Play { server_url } => pictionary::run_play(server_url).await,
        Command::Words => {
            print_words();
            Ok(())
        }
    }
}

/// Run the HTTP game server
#[instrument(skip_all, fields(config_path = %config_path.display()))]
async fn run_server(
    config_path: PathBuf,
    host: Option<String>,
    port: Option<u16>,
    database_url: Option<String>,
) -> Result<()> {
    let mut config = AppConfig::load(Some(config_path.as_path()))?;
    config.set_listen(host, port);
    if let Some(url) = database_url {
        config.set_database_url(url);
    }

    let store = open_store(config.database().url())?;
    let drawing = build_drawing_provider(&config)?;

    let engine = GameEngine::new(store, drawing).with_settings(config.game_settings());
    info!(
        max_attempts = engine.settings().max_attempts(),
        time_limit_secs = engine.settings().time_limit_secs(),
        "Engine ready"
    );

    pictionary::serve(
        config.server().host(),
        *config.server().port(),
        AppState::new(engine),
    )
    .await
}

/// Opens the configured game store, migrating SQLite files.
#[instrument]
fn open_store(url: &str) -> Result<Arc<dyn GameStore>> {
    if url == IN_MEMORY_URL {
        warn!("Using in-memory store; games are lost on restart");
        return Ok(Arc::new(MemoryGameStore::new()));
    }

    let repository = GameRepository::new(url.to_string())?;
    repository.run_migrations()?;
    info!(path = %url, "SQLite store ready");
    Ok(Arc::new(repository))
}

/// Chooses the drawing provider from config.
#[instrument(skip(config))]
fn build_drawing_provider(config: &AppConfig) -> Result<Arc<dyn DrawingProvider>> {
    let options = config.drawing_options();
    match config.create_llm_config()? {
        Some(llm_config) => Ok(Arc::new(LlmDrawingProvider::new(
            LlmClient::new(llm_config),
            options,
        ))),
        None => {
            info!("Using placeholder drawings");
            Ok(Arc::new(PlaceholderDrawing::new(options)))
        }
    }
}

fn print_words() {
    for word in GAME_WORDS {
        println!("{:<12} {}", word, category_of(word));
    }
}
