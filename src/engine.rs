//! Game session engine: create, query, guess and history operations.
//!
//! The engine holds no per-game state between calls. Every operation loads
//! the session from the store, applies the lifecycle rules of
//! [`GameSession`], and writes the change back under the version it read.
//! A concurrent writer makes that write fail with [`GameError::Conflict`],
//! which callers may retry.

use derive_more::{Display, Error};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::drawing::DrawingProvider;
use crate::game::{GameId, GameSession, GameSettings, GameStatus, GuessRejection};
use crate::store::{GameStore, StoreError};
use crate::views::{GameStateView, GuessResponse, HistoryView, NewGameView};
use crate::words::{CatalogWords, WordPicker};

/// Engine failure surfaced to callers.
#[derive(Debug, Clone, Display, Error)]
pub enum GameError {
    /// Unknown game identifier.
    #[display("Game not found: {_0}")]
    NotFound(#[error(not(source))] GameId),
    /// Guess submitted to a game that already ended.
    #[display("Game {game_id} is not active (status: {status})")]
    InvalidState {
        /// Game that refused the guess.
        game_id: GameId,
        /// Its terminal status.
        status: GameStatus,
    },
    /// Guess submitted after the time limit; the game is now timed out.
    #[display("Time limit exceeded for game {_0}")]
    Expired(#[error(not(source))] GameId),
    /// The game changed between read and write; safe to retry.
    #[display("Game {_0} was modified concurrently, retry")]
    Conflict(#[error(not(source))] GameId),
    /// Persistence failure.
    #[display("Store failure: {_0}")]
    Store(StoreError),
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { game_id, .. } => Self::Conflict(game_id),
            StoreError::Missing(game_id) => Self::NotFound(game_id),
            other => Self::Store(other),
        }
    }
}

/// Runs the game lifecycle against injected collaborators.
#[derive(Debug, Clone)]
pub struct GameEngine {
    store: Arc<dyn GameStore>,
    drawing: Arc<dyn DrawingProvider>,
    words: Arc<dyn WordPicker>,
    clock: Arc<dyn Clock>,
    settings: GameSettings,
}

impl GameEngine {
    /// Creates an engine with catalog words, the system clock and default limits.
    #[instrument(skip_all)]
    pub fn new(store: Arc<dyn GameStore>, drawing: Arc<dyn DrawingProvider>) -> Self {
        info!("Creating game engine");
        Self {
            store,
            drawing,
            words: Arc::new(CatalogWords),
            clock: Arc::new(SystemClock),
            settings: GameSettings::default(),
        }
    }

    /// Replaces the word source.
    pub fn with_words(mut self, words: Arc<dyn WordPicker>) -> Self {
        self.words = words;
        self
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the per-game limits.
    pub fn with_settings(mut self, settings: GameSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Limits applied to new games.
    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    /// Starts a new game and returns its public view.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Store`] if the game cannot be saved.
    #[instrument(skip(self))]
    pub async fn create_game(&self) -> Result<NewGameView, GameError> {
        let word = self.words.pick();
        let rendering = self.drawing.render(&word).await;
        let session = GameSession::start(
            GameId::generate(),
            word,
            rendering,
            self.settings,
            self.clock.now(),
        );

        self.store.put(&session).await.map_err(|e| {
            error!(error = %e, "Failed to save new game");
            GameError::from(e)
        })?;

        info!(game_id = %session.id(), "Game created");
        Ok(NewGameView::from_session(&session))
    }

    /// Returns the current state, timing the game out first if its clock ran out.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for an unknown id, [`GameError::Conflict`]
    /// if the timeout could not be recorded due to a concurrent write.
    #[instrument(skip(self), fields(game_id = %id))]
    pub async fn game_state(&self, id: &GameId) -> Result<GameStateView, GameError> {
        let mut session = self.load(id).await?;
        let now = self.clock.now();

        if let Some(update) = session.expire_if_due(now) {
            let version = self.store.update(id, *session.version(), update).await?;
            session.set_version(version);
            info!(version, "Timeout recorded");
        }

        debug!(status = %session.status(), attempts = session.attempts(), "Building state view");
        Ok(GameStateView::from_session(&session, now))
    }

    /// Processes one guess.
    ///
    /// # Errors
    ///
    /// - [`GameError::NotFound`] for an unknown id.
    /// - [`GameError::InvalidState`] if the game already ended; nothing changes.
    /// - [`GameError::Expired`] if the time limit passed; the game is moved
    ///   to timeout and the guess is not recorded.
    /// - [`GameError::Conflict`] if another write landed first.
    #[instrument(skip(self, guess), fields(game_id = %id))]
    pub async fn submit_guess(&self, id: &GameId, guess: &str) -> Result<GuessResponse, GameError> {
        let mut session = self.load(id).await?;
        let now = self.clock.now();
        let expected_version = *session.version();

        match session.guess(guess, now) {
            Ok((verdict, update)) => {
                self.store.update(id, expected_version, update).await?;
                let response = GuessResponse::from(verdict);
                info!(
                    correct = response.correct,
                    status = %response.status,
                    attempts = response.attempts,
                    "Guess processed"
                );
                Ok(response)
            }
            Err(GuessRejection::NotActive(status)) => {
                warn!(status = %status, "Guess on finished game rejected");
                Err(GameError::InvalidState {
                    game_id: id.clone(),
                    status,
                })
            }
            Err(GuessRejection::Expired) => {
                let update = session.apply_timeout();
                self.store.update(id, expected_version, update).await?;
                warn!("Guess after time limit, game timed out");
                Err(GameError::Expired(id.clone()))
            }
        }
    }

    /// Returns the ordered guess history, with the word once the game ended.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for an unknown id.
    #[instrument(skip(self), fields(game_id = %id))]
    pub async fn history(&self, id: &GameId) -> Result<HistoryView, GameError> {
        let session = self.load(id).await?;
        debug!(guesses = session.guesses().len(), "Building history view");
        Ok(HistoryView::from_session(&session))
    }

    async fn load(&self, id: &GameId) -> Result<GameSession, GameError> {
        match self.store.get(id).await {
            Ok(Some(session)) => Ok(session),
            Ok(None) => {
                warn!(game_id = %id, "Unknown game");
                Err(GameError::NotFound(id.clone()))
            }
            Err(e) => {
                error!(game_id = %id, error = %e, "Failed to load game");
                Err(e.into())
            }
        }
    }
}
