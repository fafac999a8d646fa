//! SQLite-backed game repository.

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, GameChangeset, GameRow, GuessRow, NewGuessRow, schema};
use crate::game::{GameId, GameSession};
use crate::store::{GameStore, GameUpdate, StoreError};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Outcome of a version-guarded update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The update was written under the new version.
    Applied {
        /// Version after the write.
        version: u64,
    },
    /// The stored version no longer matched; nothing was written.
    Stale,
    /// No game with this identifier.
    Missing,
}

/// Database repository for game sessions and their guesses.
///
/// Opens a short-lived connection per call, so the path must name a file;
/// `":memory:"` would give every call its own empty database.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path must not be empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })?;
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Inserts a new game together with any guesses it already holds.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the identifier exists or a database error occurs.
    #[instrument(skip(self, session), fields(game_id = %session.id()))]
    pub fn insert_game(&self, session: &GameSession) -> Result<(), DbError> {
        debug!("Inserting game");
        let mut conn = self.connection()?;
        let row = GameRow::from_session(session)?;
        let guesses: Vec<NewGuessRow> = session
            .guesses()
            .iter()
            .map(|entry| NewGuessRow::from_entry(session.id(), entry))
            .collect();

        conn.transaction::<_, DbError, _>(|conn| {
            diesel::insert_into(schema::games::table)
                .values(&row)
                .execute(conn)?;
            if !guesses.is_empty() {
                diesel::insert_into(schema::guesses::table)
                    .values(&guesses)
                    .execute(conn)?;
            }
            Ok(())
        })?;

        info!(status = %session.status(), "Game inserted");
        Ok(())
    }

    /// Loads a game and its guess history. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or the row is malformed.
    #[instrument(skip(self), fields(game_id = %id))]
    pub fn find_game(&self, id: &GameId) -> Result<Option<GameSession>, DbError> {
        debug!("Looking up game");
        let mut conn = self.connection()?;

        let row = schema::games::table
            .find(id.as_str())
            .select(GameRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(row) = row else {
            debug!("Game not found");
            return Ok(None);
        };

        let guesses = schema::guesses::table
            .filter(schema::guesses::game_id.eq(id.as_str()))
            .order(schema::guesses::id.asc())
            .select(GuessRow::as_select())
            .load(&mut conn)?;

        debug!(guesses = guesses.len(), "Game loaded");
        row.into_session(guesses).map(Some)
    }

    /// Applies `update` only if the stored version equals `expected_version`.
    ///
    /// Field changes, the version bump and the appended guess share one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, update), fields(game_id = %id))]
    pub fn update_game(
        &self,
        id: &GameId,
        expected_version: u64,
        update: &GameUpdate,
    ) -> Result<UpdateOutcome, DbError> {
        debug!(expected_version, "Updating game");
        let mut conn = self.connection()?;
        let version = expected_version + 1;
        let changeset = GameChangeset::from_update(update, version)?;
        let stored_version = i64::try_from(expected_version).map_err(|_| {
            DbError::new(format!("Version {} exceeds the column range", expected_version))
        })?;

        let outcome = conn.transaction::<_, DbError, _>(|conn| {
            let affected = diesel::update(
                schema::games::table
                    .filter(schema::games::id.eq(id.as_str()))
                    .filter(schema::games::version.eq(stored_version)),
            )
            .set(&changeset)
            .execute(conn)?;

            if affected == 0 {
                let exists: i64 = schema::games::table
                    .filter(schema::games::id.eq(id.as_str()))
                    .count()
                    .get_result(conn)?;
                return Ok(if exists > 0 {
                    UpdateOutcome::Stale
                } else {
                    UpdateOutcome::Missing
                });
            }

            if let Some(entry) = &update.append_guess {
                diesel::insert_into(schema::guesses::table)
                    .values(&NewGuessRow::from_entry(id, entry))
                    .execute(conn)?;
            }
            Ok(UpdateOutcome::Applied { version })
        })?;

        match outcome {
            UpdateOutcome::Applied { version } => info!(version, "Game updated"),
            UpdateOutcome::Stale => warn!(expected_version, "Stale write rejected"),
            UpdateOutcome::Missing => warn!("Update for unknown game"),
        }
        Ok(outcome)
    }
}

#[async_trait]
impl GameStore for GameRepository {
    #[instrument(skip(self), fields(game_id = %id))]
    async fn get(&self, id: &GameId) -> Result<Option<GameSession>, StoreError> {
        let repo = self.clone();
        let id = id.clone();
        let game = tokio::task::spawn_blocking(move || repo.find_game(&id))
            .await
            .map_err(DbError::from)??;
        Ok(game)
    }

    #[instrument(skip(self, session), fields(game_id = %session.id()))]
    async fn put(&self, session: &GameSession) -> Result<(), StoreError> {
        let repo = self.clone();
        let session = session.clone();
        tokio::task::spawn_blocking(move || repo.insert_game(&session))
            .await
            .map_err(DbError::from)??;
        Ok(())
    }

    #[instrument(skip(self, update), fields(game_id = %id))]
    async fn update(
        &self,
        id: &GameId,
        expected_version: u64,
        update: GameUpdate,
    ) -> Result<u64, StoreError> {
        let repo = self.clone();
        let game_id = id.clone();
        let outcome =
            tokio::task::spawn_blocking(move || repo.update_game(&game_id, expected_version, &update))
                .await
                .map_err(DbError::from)??;

        match outcome {
            UpdateOutcome::Applied { version } => Ok(version),
            UpdateOutcome::Stale => Err(StoreError::Conflict {
                game_id: id.clone(),
                expected_version,
            }),
            UpdateOutcome::Missing => Err(StoreError::Missing(id.clone())),
        }
    }
}
