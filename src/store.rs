//! Game store contract and the in-memory implementation.

use async_trait::async_trait;
use derive_more::{Display, Error};
use derive_setters::Setters;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};

use crate::db::DbError;
use crate::game::{GameId, GameSession, GameStatus, GuessEntry};

/// Typed partial update of a stored game.
///
/// Unset fields are left untouched. An appended guess and the attempt
/// counter are written together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Setters)]
#[setters(strip_option, prefix = "with_")]
pub struct GameUpdate {
    /// New lifecycle state.
    pub status: Option<GameStatus>,
    /// New score.
    pub score: Option<u32>,
    /// New attempt count.
    pub attempts: Option<u32>,
    /// Guess to append to the history.
    pub append_guess: Option<GuessEntry>,
}

impl GameUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.score.is_none()
            && self.attempts.is_none()
            && self.append_guess.is_none()
    }
}

/// Store failure.
#[derive(Debug, Clone, Display, Error)]
pub enum StoreError {
    /// The record changed since it was read.
    #[display("Game {game_id} was modified concurrently (expected version {expected_version})")]
    Conflict {
        /// Game that was being written.
        game_id: GameId,
        /// Version the writer observed.
        expected_version: u64,
    },
    /// No record with this identifier.
    #[display("Game {_0} not found in store")]
    Missing(#[error(not(source))] GameId),
    /// Underlying persistence failure.
    #[display("{_0}")]
    Backend(DbError),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::Backend(err)
    }
}

/// Persistent key-value store of game sessions.
#[async_trait]
pub trait GameStore: Send + Sync + std::fmt::Debug {
    /// Loads a game, or `None` if the identifier is unknown.
    async fn get(&self, id: &GameId) -> Result<Option<GameSession>, StoreError>;

    /// Inserts a new game.
    async fn put(&self, session: &GameSession) -> Result<(), StoreError>;

    /// Applies `update` if the stored version still equals `expected_version`.
    ///
    /// Returns the new version on success.
    async fn update(
        &self,
        id: &GameId,
        expected_version: u64,
        update: GameUpdate,
    ) -> Result<u64, StoreError>;
}

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryGameStore {
    games: Arc<Mutex<HashMap<GameId, GameSession>>>,
}

impl MemoryGameStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory game store");
        Self::default()
    }

    /// Number of stored games.
    pub fn len(&self) -> usize {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no games.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    #[instrument(skip(self), fields(game_id = %id))]
    async fn get(&self, id: &GameId) -> Result<Option<GameSession>, StoreError> {
        let games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        let game = games.get(id).cloned();
        if game.is_none() {
            debug!("Game not found");
        }
        Ok(game)
    }

    #[instrument(skip(self, session), fields(game_id = %session.id()))]
    async fn put(&self, session: &GameSession) -> Result<(), StoreError> {
        let mut games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        games.insert(session.id().clone(), session.clone());
        debug!("Game stored");
        Ok(())
    }

    #[instrument(skip(self, update), fields(game_id = %id))]
    async fn update(
        &self,
        id: &GameId,
        expected_version: u64,
        update: GameUpdate,
    ) -> Result<u64, StoreError> {
        let mut games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        let game = games
            .get_mut(id)
            .ok_or_else(|| StoreError::Missing(id.clone()))?;

        if *game.version() != expected_version {
            warn!(
                expected_version,
                actual_version = game.version(),
                "Stale write rejected"
            );
            return Err(StoreError::Conflict {
                game_id: id.clone(),
                expected_version,
            });
        }

        let version = expected_version + 1;
        game.apply(&update, version);
        debug!(version, "Game updated");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameSettings, Rendering};
    use chrono::Utc;

    fn new_game() -> GameSession {
        GameSession::start(
            GameId::generate(),
            "cat".to_string(),
            Rendering::from("<svg/>".to_string()),
            GameSettings::default(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn put_then_get() {
        let store = MemoryGameStore::new();
        let game = new_game();
        store.put(&game).await.expect("put");
        let loaded = store.get(game.id()).await.expect("get");
        assert_eq!(loaded, Some(game));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_bumps_version_and_appends() {
        let store = MemoryGameStore::new();
        let game = new_game();
        store.put(&game).await.expect("put");

        let entry = GuessEntry::new("dog".to_string(), Utc::now(), false);
        let update = GameUpdate::default()
            .with_attempts(1)
            .with_append_guess(entry.clone());
        let version = store.update(game.id(), 0, update).await.expect("update");
        assert_eq!(version, 1);

        let loaded = store
            .get(game.id())
            .await
            .expect("get")
            .expect("present");
        assert_eq!(*loaded.attempts(), 1);
        assert_eq!(loaded.guesses(), &vec![entry]);
        assert_eq!(*loaded.status(), GameStatus::Active);
    }

    #[tokio::test]
    async fn stale_version_conflicts_without_writing() {
        let store = MemoryGameStore::new();
        let game = new_game();
        store.put(&game).await.expect("put");
        store
            .update(game.id(), 0, GameUpdate::default().with_attempts(1))
            .await
            .expect("first update");

        let result = store
            .update(game.id(), 0, GameUpdate::default().with_attempts(7))
            .await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));

        let loaded = store.get(game.id()).await.expect("get").expect("present");
        assert_eq!(*loaded.attempts(), 1);
    }

    #[tokio::test]
    async fn unknown_game_update_is_missing() {
        let store = MemoryGameStore::new();
        let result = store
            .update(&GameId::from("nope"), 0, GameUpdate::default())
            .await;
        assert!(matches!(result, Err(StoreError::Missing(_))));
    }
}
