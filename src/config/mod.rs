//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

use crate::calculate::DefaultDetector;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where percentile payloads are fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Player payload path; `{id}` is replaced with the player id
    #[serde(default = "default_player_path")]
    pub player_path: String,

    /// Team payload path; `{id}` is replaced with the team id
    #[serde(default = "default_team_path")]
    pub team_path: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Payload cache directory; no caching when unset
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,

    /// Concurrent fetches while hydrating a squad
    #[serde(default = "default_fetch_width")]
    pub fetch_width: usize,

    #[serde(default = "default_max_content_size")]
    pub max_content_size: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_player_path() -> String {
    "/api/players/{id}/wyscout".to_string()
}

fn default_team_path() -> String {
    "/api/teams/{id}/wyscout".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_cache_ttl() -> String {
    "1h".to_string()
}

fn default_fetch_width() -> usize {
    10
}

fn default_max_content_size() -> usize {
    5 * 1024 * 1024
}

fn default_user_agent() -> String {
    format!("scout-compare/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            player_path: default_player_path(),
            team_path: default_team_path(),
            timeout_seconds: default_timeout(),
            cache_dir: None,
            cache_ttl: default_cache_ttl(),
            fetch_width: default_fetch_width(),
            max_content_size: default_max_content_size(),
            user_agent: default_user_agent(),
        }
    }
}

/// Comparison engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Percentile the feed writes for missing statistics
    #[serde(default = "default_neutral_percentile")]
    pub neutral_percentile: f64,

    /// Largest entity set the API accepts
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,
}

fn default_neutral_percentile() -> f64 {
    50.0
}

fn default_max_entities() -> usize {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            neutral_percentile: default_neutral_percentile(),
            max_entities: default_max_entities(),
        }
    }
}

impl EngineConfig {
    pub fn detector(&self) -> DefaultDetector {
        DefaultDetector::new(self.neutral_percentile)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            server: ServerConfig::default(),
            source: SourceConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, defaults otherwise.
    pub fn load_or_default(path: &PathBuf) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Source timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.source.fetch_width == 0 {
            return Err(ConfigError::ValidationError(
                "Fetch width must be greater than 0".to_string(),
            ));
        }

        if let Err(e) = Url::parse(&self.source.base_url) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid source base_url '{}': {}",
                self.source.base_url, e
            )));
        }

        if crate::parse_duration(&self.source.cache_ttl).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid cache_ttl '{}'",
                self.source.cache_ttl
            )));
        }

        let neutral = self.engine.neutral_percentile;
        if !(0.0..=100.0).contains(&neutral) {
            return Err(ConfigError::ValidationError(format!(
                "Neutral percentile must be within 0-100, got {}",
                neutral
            )));
        }

        if self.engine.max_entities < 2 {
            return Err(ConfigError::ValidationError(
                "max_entities must be at least 2".to_string(),
            ));
        }

        Ok(())
    }
}
