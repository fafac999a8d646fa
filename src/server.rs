//! HTTP API for the guessing game.
//!
//! Thin axum layer over [`GameEngine`]: each handler parses the request,
//! calls one engine operation and maps [`GameError`] to a status code with
//! a `{"detail": ...}` body.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, instrument, warn};

use crate::engine::{GameEngine, GameError};
use crate::game::GameId;
use crate::views::{GameStateView, GuessResponse, HistoryView, NewGameView};

/// Service name reported by the health endpoint.
pub const SERVICE_TITLE: &str = "AI Pictionary Game API";

/// Shared state for request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    engine: Arc<GameEngine>,
}

impl AppState {
    /// Wraps an engine for sharing across handlers.
    pub fn new(engine: GameEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Body of `POST /api/game/guess`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessRequest {
    /// Game to guess in.
    pub game_id: GameId,
    /// The guess text.
    pub guess: String,
}

/// Health endpoint payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service title.
    pub message: String,
    /// Crate version.
    pub version: String,
    /// Always `healthy`.
    pub status: String,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason.
    pub detail: String,
}

/// Handler error: a status code and its detail text.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        let (status, detail) = match &err {
            GameError::NotFound(_) => (StatusCode::NOT_FOUND, "Game not found"),
            GameError::InvalidState { .. } => (StatusCode::BAD_REQUEST, "Game is not active"),
            GameError::Expired(_) => (StatusCode::BAD_REQUEST, "Time limit exceeded"),
            GameError::Conflict(_) => (
                StatusCode::CONFLICT,
                "Game was modified concurrently, please retry",
            ),
            GameError::Store(e) => {
                error!(error = %e, "Store failure while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        Self {
            status,
            detail: detail.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Malformed request body");
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

/// Builds the API router over `state`.
#[instrument(skip(state))]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/game/create", post(create_game))
        .route("/api/game/guess", post(submit_guess))
        .route("/api/game/{id}", get(game_state))
        .route("/api/game/{id}/history", get(game_history))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Binds `host:port` and serves the API until the process stops.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
#[instrument(skip(state))]
pub async fn serve(host: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Server ready at http://{}/", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[instrument]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: SERVICE_TITLE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "healthy".to_string(),
    })
}

#[instrument(skip(state))]
async fn create_game(State(state): State<AppState>) -> Result<Json<NewGameView>, ApiError> {
    let view = state.engine.create_game().await?;
    Ok(Json(view))
}

#[instrument(skip(state))]
async fn game_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameStateView>, ApiError> {
    let view = state.engine.game_state(&GameId::from(id)).await?;
    Ok(Json(view))
}

#[instrument(skip(state, body))]
async fn submit_guess(
    State(state): State<AppState>,
    body: Result<Json<GuessRequest>, JsonRejection>,
) -> Result<Json<GuessResponse>, ApiError> {
    let Json(request) = body?;
    let response = state
        .engine
        .submit_guess(&request.game_id, &request.guess)
        .await?;
    Ok(Json(response))
}

#[instrument(skip(state))]
async fn game_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryView>, ApiError> {
    let view = state.engine.history(&GameId::from(id)).await?;
    Ok(Json(view))
}
