//! Game session domain model and its lifecycle rules.
//!
//! A [`GameSession`] starts [`GameStatus::Active`] and moves exactly once to
//! one of the terminal states. The transitions here are pure: they compute
//! the next state and the [`GameUpdate`] that persists it, leaving I/O to
//! the engine.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::hints::hint;
use crate::scoring::score;
use crate::store::GameUpdate;

/// Attempts allowed per game unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Seconds allowed per game unless configured otherwise.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 120;

/// Unique, never reused identifier of a game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Generates a fresh random identifier.
    #[instrument]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Illustration of the secret word (SVG markup).
#[derive(Debug, Clone, PartialEq, Eq, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rendering(String);

impl Rendering {
    /// Returns the markup.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the rendering, returning the markup.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Lifecycle state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Accepting guesses.
    Active,
    /// The word was guessed.
    Won,
    /// Every attempt was used without a match.
    Lost,
    /// The time limit ran out.
    Timeout,
}

impl GameStatus {
    /// Whether no further guesses are accepted.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Converts status to the string stored in the database.
    #[instrument]
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Timeout => "timeout",
        }
    }

    /// Parses status from the string stored in the database.
    #[instrument(skip(s), fields(s = %s))]
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "won" => Some(Self::Won),
            "lost" => Some(Self::Lost),
            "timeout" => Some(Self::Timeout),
            _ => None,
        }
    }
}

/// One recorded guess. Serialized with the public wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
pub struct GuessEntry {
    /// Guess as the player typed it.
    #[serde(rename = "guess")]
    text: String,
    /// When the guess was processed.
    timestamp: DateTime<Utc>,
    /// Whether it matched the secret word.
    #[serde(rename = "correct")]
    was_correct: bool,
}

/// Per-game limits fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, derive_new::new)]
pub struct GameSettings {
    max_attempts: u32,
    time_limit_secs: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_TIME_LIMIT_SECS)
    }
}

/// One play-through of the guessing game.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct GameSession {
    id: GameId,
    secret_word: String,
    rendering: Rendering,
    status: GameStatus,
    score: u32,
    attempts: u32,
    max_attempts: u32,
    start_time: DateTime<Utc>,
    time_limit_secs: u32,
    guesses: Vec<GuessEntry>,
    /// Bumped by every persisted update; guards against lost writes.
    version: u64,
}

/// What a processed guess did to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessVerdict {
    /// The guess matched.
    Won {
        /// Points awarded.
        score: u32,
        /// Attempts used, including this one.
        attempts: u32,
        /// The secret word.
        word: String,
    },
    /// Last attempt used without a match.
    Lost {
        /// Attempts used.
        attempts: u32,
        /// The secret word.
        word: String,
    },
    /// Wrong guess with attempts to spare.
    Continue {
        /// Attempts used.
        attempts: u32,
        /// Attempt limit.
        max_attempts: u32,
        /// Hint for the next guess.
        hint: Option<String>,
    },
}

/// Why a session refused a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessRejection {
    /// The game already ended.
    NotActive(GameStatus),
    /// The time limit passed; the session must move to timeout.
    Expired,
}

impl GameSession {
    /// Starts a fresh active game.
    #[instrument(skip(secret_word, rendering), fields(game_id = %id))]
    pub fn start(
        id: GameId,
        secret_word: String,
        rendering: Rendering,
        settings: GameSettings,
        start_time: DateTime<Utc>,
    ) -> Self {
        info!(
            max_attempts = settings.max_attempts,
            time_limit = settings.time_limit_secs,
            "Starting game session"
        );
        Self {
            id,
            secret_word,
            rendering,
            status: GameStatus::Active,
            score: 0,
            attempts: 0,
            max_attempts: settings.max_attempts,
            start_time,
            time_limit_secs: settings.time_limit_secs,
            guesses: Vec::new(),
            version: 0,
        }
    }

    /// Reassembles a session from stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: GameId,
        secret_word: String,
        rendering: Rendering,
        status: GameStatus,
        score: u32,
        attempts: u32,
        max_attempts: u32,
        start_time: DateTime<Utc>,
        time_limit_secs: u32,
        guesses: Vec<GuessEntry>,
        version: u64,
    ) -> Self {
        Self {
            id,
            secret_word,
            rendering,
            status,
            score,
            attempts,
            max_attempts,
            start_time,
            time_limit_secs,
            guesses,
            version,
        }
    }

    /// Seconds since the game started, with sub-second precision. Never negative.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.start_time).num_milliseconds().max(0);
        millis as f64 / 1000.0
    }

    /// Whole seconds left on the clock.
    pub fn time_left(&self, now: DateTime<Utc>) -> u32 {
        let elapsed = self.elapsed_secs(now).floor() as i64;
        (i64::from(self.time_limit_secs) - elapsed).max(0) as u32
    }

    /// The secret word, only once the game has ended.
    pub fn revealed_word(&self) -> Option<&str> {
        self.status
            .is_terminal()
            .then_some(self.secret_word.as_str())
    }

    /// The hint for the current attempt count, only while active.
    pub fn current_hint(&self) -> Option<String> {
        if self.status.is_terminal() {
            return None;
        }
        hint(&self.secret_word, self.attempts)
    }

    /// Detects lazy expiry on read: an active game with no time left becomes
    /// a timeout. Returns the update to persist, if the state changed.
    #[instrument(skip(self), fields(game_id = %self.id, status = %self.status))]
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> Option<GameUpdate> {
        if self.status != GameStatus::Active || self.time_left(now) > 0 {
            return None;
        }
        info!("Time limit reached, game timed out");
        Some(self.apply_timeout())
    }

    /// Processes a guess against the secret word.
    ///
    /// On success the session already reflects the guess and the returned
    /// update carries the same change for the store. On
    /// [`GuessRejection::Expired`] the caller must persist the timeout via
    /// [`GameSession::apply_timeout`].
    #[instrument(skip(self, text), fields(game_id = %self.id, attempts = self.attempts))]
    pub fn guess(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(GuessVerdict, GameUpdate), GuessRejection> {
        if self.status != GameStatus::Active {
            return Err(GuessRejection::NotActive(self.status));
        }

        let elapsed = self.elapsed_secs(now);
        if elapsed > f64::from(self.time_limit_secs) {
            debug!(elapsed, "Guess arrived after time limit");
            return Err(GuessRejection::Expired);
        }

        let normalized = text.trim().to_lowercase();
        let correct = normalized == self.secret_word.to_lowercase();
        let entry = GuessEntry::new(text.to_string(), now, correct);

        self.attempts += 1;
        self.guesses.push(entry.clone());
        let update = GameUpdate::default()
            .with_attempts(self.attempts)
            .with_append_guess(entry);

        if correct {
            self.score = score(
                self.attempts,
                elapsed.trunc() as u64,
                u64::from(self.time_limit_secs),
            );
            self.status = GameStatus::Won;
            info!(score = self.score, attempts = self.attempts, "Word guessed");
            let verdict = GuessVerdict::Won {
                score: self.score,
                attempts: self.attempts,
                word: self.secret_word.clone(),
            };
            return Ok((
                verdict,
                update.with_status(GameStatus::Won).with_score(self.score),
            ));
        }

        if self.attempts >= self.max_attempts {
            self.status = GameStatus::Lost;
            info!(attempts = self.attempts, "Out of attempts");
            let verdict = GuessVerdict::Lost {
                attempts: self.attempts,
                word: self.secret_word.clone(),
            };
            return Ok((verdict, update.with_status(GameStatus::Lost)));
        }

        debug!(attempts = self.attempts, "Wrong guess");
        let verdict = GuessVerdict::Continue {
            attempts: self.attempts,
            max_attempts: self.max_attempts,
            hint: hint(&self.secret_word, self.attempts),
        };
        Ok((verdict, update))
    }

    /// Moves the session to timeout and returns the update to persist.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn apply_timeout(&mut self) -> GameUpdate {
        self.status = GameStatus::Timeout;
        GameUpdate::default().with_status(GameStatus::Timeout)
    }

    /// Applies a stored partial update and adopts `version`.
    #[instrument(skip(self, update), fields(game_id = %self.id))]
    pub fn apply(&mut self, update: &GameUpdate, version: u64) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(score) = update.score {
            self.score = score;
        }
        if let Some(attempts) = update.attempts {
            self.attempts = attempts;
        }
        if let Some(entry) = &update.append_guess {
            self.guesses.push(entry.clone());
        }
        self.version = version;
    }

    /// Records that a stored update succeeded under `version`.
    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
