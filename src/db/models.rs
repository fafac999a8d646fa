//! Database rows and their mapping to the game domain.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use crate::db::{DbError, schema};
use crate::game::{GameId, GameSession, GameStatus, GuessEntry, Rendering};
use crate::store::GameUpdate;

/// Stored game record.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Insertable, Getters)]
#[diesel(table_name = schema::games)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameRow {
    id: String,
    secret_word: String,
    rendering: String,
    status: String,
    score: i32,
    attempts: i32,
    max_attempts: i32,
    started_at: NaiveDateTime,
    time_limit_secs: i32,
    version: i64,
}

impl GameRow {
    /// Flattens a session into its stored form. Guesses are stored separately.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a counter does not fit its column.
    #[instrument(skip(session), fields(game_id = %session.id()))]
    pub fn from_session(session: &GameSession) -> Result<Self, DbError> {
        Ok(Self {
            id: session.id().to_string(),
            secret_word: session.secret_word().clone(),
            rendering: session.rendering().to_string(),
            status: session.status().to_db_string().to_string(),
            score: to_column(*session.score(), "score")?,
            attempts: to_column(*session.attempts(), "attempts")?,
            max_attempts: to_column(*session.max_attempts(), "max_attempts")?,
            started_at: session.start_time().naive_utc(),
            time_limit_secs: to_column(*session.time_limit_secs(), "time_limit_secs")?,
            version: version_to_column(*session.version())?,
        })
    }

    /// Rebuilds the session from this row and its guesses, in submission order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored status is not a known value.
    #[instrument(skip(self, guesses), fields(game_id = %self.id))]
    pub fn into_session(self, guesses: Vec<GuessRow>) -> Result<GameSession, DbError> {
        let status = GameStatus::from_db_string(&self.status)
            .ok_or_else(|| DbError::new(format!("Invalid status: '{}'", self.status)))?;
        let guesses = guesses.into_iter().map(GuessRow::into_entry).collect();

        Ok(GameSession::from_parts(
            GameId::from(self.id),
            self.secret_word,
            Rendering::from(self.rendering),
            status,
            from_column(self.score, "score")?,
            from_column(self.attempts, "attempts")?,
            from_column(self.max_attempts, "max_attempts")?,
            self.started_at.and_utc(),
            from_column(self.time_limit_secs, "time_limit_secs")?,
            guesses,
            u64::try_from(self.version)
                .map_err(|_| DbError::new(format!("Negative stored version: {}", self.version)))?,
        ))
    }
}

/// Columns touched by a partial update. `None` fields are left as stored.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::games)]
pub struct GameChangeset {
    status: Option<String>,
    score: Option<i32>,
    attempts: Option<i32>,
    version: i64,
}

impl GameChangeset {
    /// Builds the changeset for `update`, stamping the next version.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a counter does not fit its column.
    #[instrument(skip(update))]
    pub fn from_update(update: &GameUpdate, version: u64) -> Result<Self, DbError> {
        Ok(Self {
            status: update.status.map(|s| s.to_db_string().to_string()),
            score: update.score.map(|s| to_column(s, "score")).transpose()?,
            attempts: update.attempts.map(|a| to_column(a, "attempts")).transpose()?,
            version: version_to_column(version)?,
        })
    }
}

#[track_caller]
fn to_column(value: u32, column: &str) -> Result<i32, DbError> {
    i32::try_from(value)
        .map_err(|_| DbError::new(format!("{} = {} exceeds the column range", column, value)))
}

#[track_caller]
fn from_column(value: i32, column: &str) -> Result<u32, DbError> {
    u32::try_from(value)
        .map_err(|_| DbError::new(format!("Stored {} is negative: {}", column, value)))
}

#[track_caller]
fn version_to_column(version: u64) -> Result<i64, DbError> {
    i64::try_from(version)
        .map_err(|_| DbError::new(format!("Version {} exceeds the column range", version)))
}

/// Stored guess.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::guesses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GuessRow {
    id: i32,
    game_id: String,
    guess_text: String,
    guessed_at: NaiveDateTime,
    was_correct: bool,
}

impl GuessRow {
    /// Converts the row into a history entry.
    pub fn into_entry(self) -> GuessEntry {
        GuessEntry::new(self.guess_text, self.guessed_at.and_utc(), self.was_correct)
    }
}

/// Insertable guess.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::guesses)]
pub struct NewGuessRow {
    game_id: String,
    guess_text: String,
    guessed_at: NaiveDateTime,
    was_correct: bool,
}

impl NewGuessRow {
    /// Builds the row recording `entry` against `game_id`.
    pub fn from_entry(game_id: &GameId, entry: &GuessEntry) -> Self {
        Self::new(
            game_id.to_string(),
            entry.text().clone(),
            entry.timestamp().naive_utc(),
            *entry.was_correct(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameSettings;
    use chrono::Utc;

    fn session(settings: GameSettings) -> GameSession {
        GameSession::start(
            GameId::from("g"),
            "cat".to_string(),
            Rendering::from("<svg/>".to_string()),
            settings,
            Utc::now(),
        )
    }

    #[test]
    fn oversized_counter_is_rejected_not_wrapped() {
        let result = GameRow::from_session(&session(GameSettings::new(3_000_000_000, 120)));
        assert!(result.is_err());
    }

    #[test]
    fn largest_column_value_round_trips() {
        let max = i32::MAX as u32;
        let row = GameRow::from_session(&session(GameSettings::new(max, max))).expect("fits");
        let restored = row.into_session(Vec::new()).expect("valid row");
        assert_eq!(*restored.max_attempts(), max);
        assert_eq!(*restored.time_limit_secs(), max);
    }

    #[test]
    fn negative_stored_counter_is_an_error() {
        let mut row = GameRow::from_session(&session(GameSettings::default())).expect("fits");
        row.max_attempts = -1;
        assert!(row.into_session(Vec::new()).is_err());
    }

    #[test]
    fn changeset_rejects_oversized_attempts() {
        let update = GameUpdate::default().with_attempts(u32::MAX);
        assert!(GameChangeset::from_update(&update, 1).is_err());
    }
}
