use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - please edit it with your API key and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Missing required config field: {field}")]
    ConfigMissingField { field: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Session errors
    #[error("A game requires at least 2 players, got {count}")]
    NotEnoughPlayers { count: usize },

    #[error("A game session is already running or starting")]
    SessionAlreadyStarted,

    #[error("Content provider returned an empty playlist")]
    EmptyPlaylist,

    // Provider errors
    #[error("Content provider {provider} failed: {reason}")]
    ProviderFailed { provider: String, reason: String },

    #[error("Media playback failed: {reason}")]
    PlaybackFailed { reason: String },

    #[error("Speech recognition failed: {reason}")]
    RecognitionFailed { reason: String },

    // Network errors
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Network request failed: {0}")]
    RequestError(#[from] reqwest_middleware::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
