//! Client-facing projections of a game.
//!
//! Field names follow the public JSON API (camelCase). The secret word only
//! ever appears in a projection of a terminal game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::{GameId, GameSession, GameStatus, GuessEntry, GuessVerdict, Rendering};

/// Returned by game creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameView {
    /// Identifier for later calls.
    pub game_id: GameId,
    /// Illustration of the word.
    pub drawing: Rendering,
    /// Always active.
    pub status: GameStatus,
    /// Always 0.
    pub score: u32,
    /// Always 0.
    pub attempts: u32,
    /// Attempt limit.
    pub max_attempts: u32,
    /// When the clock started.
    pub start_time: DateTime<Utc>,
    /// Seconds allowed.
    pub time_limit: u32,
    /// Always empty.
    pub guesses: Vec<GuessEntry>,
    /// Equal to the time limit.
    pub time_left: u32,
}

impl NewGameView {
    /// Projects a freshly created session.
    pub fn from_session(session: &GameSession) -> Self {
        Self {
            game_id: session.id().clone(),
            drawing: session.rendering().clone(),
            status: *session.status(),
            score: *session.score(),
            attempts: *session.attempts(),
            max_attempts: *session.max_attempts(),
            start_time: *session.start_time(),
            time_limit: *session.time_limit_secs(),
            guesses: session.guesses().clone(),
            time_left: *session.time_limit_secs(),
        }
    }
}

/// Current state of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    /// Game identifier.
    pub game_id: GameId,
    /// Illustration of the word.
    pub drawing: Rendering,
    /// Lifecycle state.
    pub status: GameStatus,
    /// Score, non-zero only once won.
    pub score: u32,
    /// Guesses so far.
    pub attempts: u32,
    /// Attempt limit.
    pub max_attempts: u32,
    /// Whole seconds remaining.
    pub time_left: u32,
    /// Hint for the current attempt count; active games only.
    pub hint: Option<String>,
    /// Secret word; terminal games only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
}

impl GameStateView {
    /// Projects `session` as seen at `now`.
    pub fn from_session(session: &GameSession, now: DateTime<Utc>) -> Self {
        Self {
            game_id: session.id().clone(),
            drawing: session.rendering().clone(),
            status: *session.status(),
            score: *session.score(),
            attempts: *session.attempts(),
            max_attempts: *session.max_attempts(),
            time_left: session.time_left(now),
            hint: session.current_hint(),
            word: session.revealed_word().map(str::to_string),
        }
    }
}

/// Outcome of one processed guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponse {
    /// Whether the guess matched.
    pub correct: bool,
    /// Status after the guess.
    pub status: GameStatus,
    /// Points awarded; won games only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    /// Attempts used.
    pub attempts: u32,
    /// Attempt limit; active games only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Secret word; terminal games only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    /// Hint for the next guess; active games only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Human-readable summary.
    pub message: String,
}

impl From<GuessVerdict> for GuessResponse {
    fn from(verdict: GuessVerdict) -> Self {
        match verdict {
            GuessVerdict::Won {
                score,
                attempts,
                word,
            } => Self {
                correct: true,
                status: GameStatus::Won,
                score: Some(score),
                attempts,
                max_attempts: None,
                word: Some(word),
                hint: None,
                message: "Congratulations! You guessed it!".to_string(),
            },
            GuessVerdict::Lost { attempts, word } => Self {
                correct: false,
                status: GameStatus::Lost,
                score: None,
                attempts,
                max_attempts: None,
                message: format!("Game over! The word was '{}'", word),
                word: Some(word),
                hint: None,
            },
            GuessVerdict::Continue {
                attempts,
                max_attempts,
                hint,
            } => Self {
                correct: false,
                status: GameStatus::Active,
                score: None,
                attempts,
                max_attempts: Some(max_attempts),
                word: None,
                hint,
                message: format!(
                    "Try again! {} attempts left.",
                    max_attempts.saturating_sub(attempts)
                ),
            },
        }
    }
}

/// Ordered guess history of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    /// Game identifier.
    pub game_id: GameId,
    /// Guesses in submission order.
    pub guesses: Vec<GuessEntry>,
    /// Secret word once the game has ended, otherwise null.
    pub word: Option<String>,
}

impl HistoryView {
    /// Projects the history of `session`.
    pub fn from_session(session: &GameSession) -> Self {
        Self {
            game_id: session.id().clone(),
            guesses: session.guesses().clone(),
            word: session.revealed_word().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameSettings;
    use chrono::Duration;

    fn session() -> GameSession {
        GameSession::start(
            GameId::from("g-1"),
            "cat".to_string(),
            Rendering::from("<svg/>".to_string()),
            GameSettings::default(),
            Utc::now(),
        )
    }

    #[test]
    fn state_view_hides_word_while_active() {
        let game = session();
        let view = GameStateView::from_session(&game, *game.start_time());
        let json = serde_json::to_value(&view).expect("serialize");
        assert!(json.get("word").is_none());
        assert_eq!(json["timeLeft"], 120);
        assert_eq!(json["maxAttempts"], 5);
        assert_eq!(json["status"], "active");
        assert!(json["hint"].is_null());
    }

    #[test]
    fn state_view_reveals_word_when_terminal() {
        let mut game = session();
        game.apply_timeout();
        let view = GameStateView::from_session(&game, *game.start_time() + Duration::seconds(200));
        assert_eq!(view.word.as_deref(), Some("cat"));
        assert_eq!(view.hint, None);
        assert_eq!(view.time_left, 0);
    }

    #[test]
    fn new_game_view_has_full_clock_and_no_word() {
        let game = session();
        let json = serde_json::to_value(NewGameView::from_session(&game)).expect("serialize");
        assert_eq!(json["gameId"], "g-1");
        assert_eq!(json["timeLeft"], 120);
        assert_eq!(json["timeLimit"], 120);
        assert!(json.get("word").is_none());
        assert!(json.get("secretWord").is_none());
    }

    #[test]
    fn continue_message_counts_remaining() {
        let response = GuessResponse::from(GuessVerdict::Continue {
            attempts: 2,
            max_attempts: 5,
            hint: Some("This word has 3 letters".to_string()),
        });
        assert_eq!(response.message, "Try again! 3 attempts left.");
        assert_eq!(response.status, GameStatus::Active);
        assert!(!response.correct);
    }

    #[test]
    fn history_entries_use_wire_names() {
        let mut game = session();
        game.guess("Dog", *game.start_time()).expect("accepted");
        let json = serde_json::to_value(HistoryView::from_session(&game)).expect("serialize");
        assert_eq!(json["guesses"][0]["guess"], "Dog");
        assert_eq!(json["guesses"][0]["correct"], false);
        assert!(json["word"].is_null());
    }
}
