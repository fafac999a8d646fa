//! Server configuration: TOML file, then environment overrides.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::drawing::DrawingOptions;
use crate::game::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIME_LIMIT_SECS, GameSettings};
use crate::llm_client::{LlmConfig, LlmProvider};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener.
    #[serde(default)]
    server: ServerSection,
    /// Game store.
    #[serde(default)]
    database: DatabaseSection,
    /// Per-game limits.
    #[serde(default)]
    game: GameSection,
    /// Drawing provider.
    #[serde(default)]
    drawing: DrawingSection,
}

/// Where the HTTP API listens.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ServerSection {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,
}

/// Game store location.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// SQLite file path, or `:memory:` for a process-local store.
    #[serde(default = "default_database_url")]
    url: String,
}

/// Limits fixed on every new game.
#[derive(Debug, Clone, Copy, Getters, Serialize, Deserialize)]
pub struct GameSection {
    /// Guesses allowed per game.
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,
    /// Seconds allowed per game.
    #[serde(default = "default_time_limit_secs")]
    time_limit_secs: u32,
}

/// Which drawing backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingBackend {
    /// OpenAI or an OpenAI-compatible gateway.
    OpenAI,
    /// Anthropic.
    Anthropic,
    /// No model; always the placeholder.
    Placeholder,
}

/// Drawing provider settings.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct DrawingSection {
    /// Backend selection.
    #[serde(default = "default_backend")]
    provider: DrawingBackend,
    /// Model name.
    #[serde(default = "default_model")]
    model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    temperature: f32,
    /// Maximum tokens per drawing.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    /// Optional OpenAI-compatible API base.
    #[serde(default)]
    base_url: Option<String>,
    /// Canvas width in pixels.
    #[serde(default = "default_canvas")]
    width: u32,
    /// Canvas height in pixels.
    #[serde(default = "default_canvas")]
    height: u32,
    /// Deadline for one drawing call.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "pictionary.db".to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_time_limit_secs() -> u32 {
    DEFAULT_TIME_LIMIT_SECS
}

fn default_backend() -> DrawingBackend {
    DrawingBackend::OpenAI
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_canvas() -> u32 {
    400
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            time_limit_secs: default_time_limit_secs(),
        }
    }
}

impl Default for DrawingSection {
    fn default() -> Self {
        Self {
            provider: default_backend(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            base_url: None,
            width: default_canvas(),
            height: default_canvas(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file if given and present, otherwise defaults, then applies
    /// environment overrides.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                info!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        info!(
            host = %config.server.host,
            port = config.server.port,
            database = %config.database.url,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Applies `PICTIONARY_*` overrides read through `lookup`.
    #[instrument(skip(self, lookup))]
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("PICTIONARY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PICTIONARY_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid PICTIONARY_PORT '{}': {}", port, e)))?;
        }
        if let Some(url) = lookup("PICTIONARY_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(base_url) = lookup("PICTIONARY_LLM_BASE_URL") {
            self.drawing.base_url = Some(base_url);
        }
        Ok(())
    }

    /// Overrides the listener address.
    pub fn set_listen(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
    }

    /// Overrides the database location.
    pub fn set_database_url(&mut self, url: String) {
        self.database.url = url;
    }

    /// Rejects limits no game could be played under or stored.
    fn validate(&self) -> Result<(), ConfigError> {
        let stored_max = i32::MAX as u32;
        if self.game.max_attempts == 0 {
            return Err(ConfigError::new("game.max_attempts must be at least 1".to_string()));
        }
        if self.game.time_limit_secs == 0 {
            return Err(ConfigError::new("game.time_limit_secs must be at least 1".to_string()));
        }
        if self.game.max_attempts > stored_max || self.game.time_limit_secs > stored_max {
            return Err(ConfigError::new(format!(
                "game limits must not exceed {}",
                stored_max
            )));
        }
        Ok(())
    }

    /// Game limits for the engine.
    pub fn game_settings(&self) -> GameSettings {
        GameSettings::new(self.game.max_attempts, self.game.time_limit_secs)
    }

    /// Canvas and deadline for the drawing provider.
    pub fn drawing_options(&self) -> DrawingOptions {
        DrawingOptions::new(
            self.drawing.width,
            self.drawing.height,
            Duration::from_secs(self.drawing.timeout_secs),
        )
    }

    /// Creates the LLM configuration for the drawing provider.
    ///
    /// Returns `None` for the placeholder backend. Requires `OPENAI_API_KEY`
    /// or `ANTHROPIC_API_KEY` otherwise.
    #[instrument(skip(self), fields(provider = ?self.drawing.provider, model = %self.drawing.model))]
    pub fn create_llm_config(&self) -> Result<Option<LlmConfig>, ConfigError> {
        let (provider, key_var) = match self.drawing.provider {
            DrawingBackend::Placeholder => return Ok(None),
            DrawingBackend::OpenAI => (LlmProvider::OpenAI, "OPENAI_API_KEY"),
            DrawingBackend::Anthropic => (LlmProvider::Anthropic, "ANTHROPIC_API_KEY"),
        };

        let api_key = std::env::var(key_var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", key_var)))?;

        let config = LlmConfig::new(
            provider,
            api_key,
            self.drawing.model.clone(),
            self.drawing.max_tokens,
            self.drawing.temperature,
        )
        .with_base_url(self.drawing.base_url.clone());
        Ok(Some(config))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_rules() {
        let config = AppConfig::default();
        assert_eq!(*config.game().max_attempts(), 5);
        assert_eq!(*config.game().time_limit_secs(), 120);
        assert_eq!(config.server().port(), &3000);
        assert_eq!(*config.drawing().provider(), DrawingBackend::OpenAI);
        assert_eq!(config.drawing().model(), "gpt-4o-mini");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 8080

            [drawing]
            provider = "placeholder"
            "#,
        )
        .expect("valid config");
        assert_eq!(*config.server().port(), 8080);
        assert_eq!(config.server().host(), "127.0.0.1");
        assert_eq!(*config.drawing().provider(), DrawingBackend::Placeholder);
        assert_eq!(*config.drawing().width(), 400);
        assert!(config.create_llm_config().expect("no key needed").is_none());
    }

    #[test]
    fn zero_attempts_rejected() {
        let result = AppConfig::from_toml_str("[game]\nmax_attempts = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn limits_beyond_storage_range_rejected() {
        let result = AppConfig::from_toml_str("[game]\nmax_attempts = 3000000000\n");
        assert!(result.is_err());
        let result = AppConfig::from_toml_str("[game]\ntime_limit_secs = 2147483648\n");
        assert!(result.is_err());
        let config = AppConfig::from_toml_str("[game]\nmax_attempts = 2147483647\n")
            .expect("largest stored value is allowed");
        assert_eq!(*config.game().max_attempts(), i32::MAX as u32);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_env(|key| match key {
                "PICTIONARY_PORT" => Some("9999".to_string()),
                "PICTIONARY_DATABASE_URL" => Some(":memory:".to_string()),
                _ => None,
            })
            .expect("valid overrides");
        assert_eq!(*config.server().port(), 9999);
        assert_eq!(config.database().url(), ":memory:");
    }

    #[test]
    fn bad_port_override_fails() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|key| (key == "PICTIONARY_PORT").then(|| "http".to_string()));
        assert!(result.is_err());
    }
}
