//! HTTP client for the game API and a line-based terminal front end.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

use crate::game::{GameId, GameStatus, Rendering};
use crate::server::{ErrorResponse, GuessRequest};
use crate::views::{GameStateView, GuessResponse, HistoryView, NewGameView};

/// Typed client for a running game server.
#[derive(Debug, Clone)]
pub struct GameClient {
    base_url: String,
    client: reqwest::Client,
}

impl GameClient {
    /// Creates a client for the server at `base_url`.
    #[instrument]
    pub fn new(base_url: String) -> Self {
        info!("Creating game client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Starts a new game.
    #[instrument(skip(self))]
    pub async fn create_game(&self) -> Result<NewGameView> {
        let response = self
            .client
            .post(format!("{}/api/game/create", self.base_url))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Fetches the current state of a game.
    #[instrument(skip(self), fields(game_id = %id))]
    pub async fn game_state(&self, id: &GameId) -> Result<GameStateView> {
        let response = self
            .client
            .get(format!("{}/api/game/{}", self.base_url, id))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Submits a guess.
    #[instrument(skip(self, guess), fields(game_id = %id))]
    pub async fn guess(&self, id: &GameId, guess: &str) -> Result<GuessResponse> {
        let request = GuessRequest {
            game_id: id.clone(),
            guess: guess.to_string(),
        };
        let response = self
            .client
            .post(format!("{}/api/game/guess", self.base_url))
            .json(&request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Fetches the guess history of a game.
    #[instrument(skip(self), fields(game_id = %id))]
    pub async fn history(&self, id: &GameId) -> Result<HistoryView> {
        let response = self
            .client
            .get(format!("{}/api/game/{}/history", self.base_url, id))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, length = body.len(), "Got response");

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.detail)
                .unwrap_or(body);
            anyhow::bail!("{} ({})", detail, status);
        }
        serde_json::from_str(&body).context("Unexpected response body")
    }
}

/// Plays one game interactively on stdin/stdout.
///
/// Each input line is a guess. `:state` shows time and hint, `:history`
/// lists guesses so far, `:quit` leaves the game.
#[instrument]
pub async fn run_play(server_url: String) -> Result<()> {
    let client = GameClient::new(server_url);
    let game = client.create_game().await?;
    let id = game.game_id.clone();

    let drawing_path = save_drawing(&std::env::temp_dir(), &id, &game.drawing).await?;

    println!("New game {}", id);
    println!("Drawing saved to {}", drawing_path.display());
    println!(
        "You have {} attempts and {} seconds. Type a guess, or :state, :history, :quit.",
        game.max_attempts, game.time_limit
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            ":quit" => break,
            ":state" => {
                let state = client.game_state(&id).await?;
                print_state(&state);
                if state.status.is_terminal() {
                    break;
                }
            }
            ":history" => {
                let history = client.history(&id).await?;
                for (n, entry) in history.guesses.iter().enumerate() {
                    let mark = if *entry.was_correct() { "correct" } else { "wrong" };
                    println!("{:>2}. {} ({})", n + 1, entry.text(), mark);
                }
            }
            guess => match client.guess(&id, guess).await {
                Ok(outcome) => {
                    println!("{}", outcome.message);
                    if let Some(hint) = &outcome.hint {
                        println!("Hint: {}", hint);
                    }
                    if let Some(score) = outcome.score {
                        println!("Score: {}", score);
                    }
                    if outcome.status != GameStatus::Active {
                        break;
                    }
                }
                Err(e) => {
                    println!("{}", e);
                    let state = client.game_state(&id).await?;
                    if state.status.is_terminal() {
                        print_state(&state);
                        break;
                    }
                }
            },
        }
    }

    Ok(())
}

/// Writes the drawing to `dir` as `pictionary-{id}.svg` and returns the path.
#[instrument(skip(drawing))]
async fn save_drawing(dir: &Path, id: &GameId, drawing: &Rendering) -> Result<PathBuf> {
    let path = dir.join(format!("pictionary-{}.svg", id));
    tokio::fs::write(&path, drawing.as_str())
        .await
        .with_context(|| format!("Failed to write drawing to {}", path.display()))?;
    debug!(path = %path.display(), "Drawing saved");
    Ok(path)
}

fn print_state(state: &GameStateView) {
    println!(
        "Status: {} | attempts {}/{} | {}s left",
        state.status, state.attempts, state.max_attempts, state.time_left
    );
    if let Some(hint) = &state.hint {
        println!("Hint: {}", hint);
    }
    if let Some(word) = &state.word {
        println!("The word was '{}'", word);
    }
}
