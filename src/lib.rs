//! Pictionary library - word-guessing game with AI-generated drawings
//!
//! A player is shown a drawing of a secret word and has a limited number of
//! attempts and a time limit to guess it. Hints get more revealing as
//! attempts run out, and a win scores more the faster and earlier it comes.
//!
//! # Architecture
//!
//! - **Game**: pure session state machine, hints and scoring
//! - **Engine**: create / state / guess / history against injected collaborators
//! - **Store**: versioned game persistence (in-memory or diesel/SQLite)
//! - **Drawing**: LLM-generated SVG with a placeholder fallback
//! - **Server**: axum HTTP API
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pictionary::{GameEngine, MemoryGameStore, PlaceholderDrawing};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = GameEngine::new(
//!     Arc::new(MemoryGameStore::new()),
//!     Arc::new(PlaceholderDrawing::default()),
//! );
//! let game = engine.create_game().await?;
//! let outcome = engine.submit_guess(&game.game_id, "cat").await?;
//! println!("{}", outcome.message);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod client;
mod clock;
mod config;
mod db;
mod drawing;
mod engine;
mod game;
mod hints;
mod llm_client;
mod scoring;
mod server;
mod store;
mod views;
mod words;

// Crate-level exports - Game model
pub use game::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_TIME_LIMIT_SECS, GameId, GameSession, GameSettings, GameStatus,
    GuessEntry, GuessRejection, GuessVerdict, Rendering,
};
pub use hints::hint;
pub use scoring::{ATTEMPT_PENALTY, BASE_SCORE, MIN_SCORE, score};
pub use words::{CatalogWords, Category, FixedWord, GAME_WORDS, WordPicker, category_of, pick_random_word};

// Crate-level exports - Engine and views
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{GameEngine, GameError};
pub use views::{GameStateView, GuessResponse, HistoryView, NewGameView};

// Crate-level exports - Persistence
pub use db::{DbError, GameRepository, UpdateOutcome};
pub use store::{GameStore, GameUpdate, MemoryGameStore, StoreError};

// Crate-level exports - Drawing and LLM client
pub use drawing::{
    DrawingOptions, DrawingProvider, LlmDrawingProvider, PlaceholderDrawing, ensure_svg_root,
    placeholder_svg,
};
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Configuration
pub use config::{
    AppConfig, ConfigError, DatabaseSection, DrawingBackend, DrawingSection, GameSection,
    ServerSection,
};

// Crate-level exports - HTTP
pub use client::{GameClient, run_play};
pub use server::{
    AppState, ErrorResponse, GuessRequest, HealthResponse, SERVICE_TITLE, router, serve,
};
