pub mod config;
pub mod error;
pub mod listener;
pub mod media;
pub mod paths;
pub mod player;
pub mod provider;
pub mod session;
pub mod song;
pub mod state;
pub mod themes;
pub mod voice;

pub use config::{GameConfig, GeminiConfig, LoggingConfig, SangkampConfig, VoiceConfig};
pub use error::CoreError;

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use listener::VoiceListener;
pub use media::{MediaPlayer, SpeechRecognizer};
pub use paths::{
    config_dir, config_path, log_file_path, saved_themes_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
    LOG_FILE_NAME, SAVED_THEMES_FILE_NAME,
};
pub use player::{Player, POINTS_PER_CORRECT};
pub use provider::{ContentProvider, PlaylistQuery};
pub use session::{SessionController, SessionEvent};
pub use song::{Difficulty, GameSettings, Song};
pub use state::{GameState, GameStatus};
pub use themes::{SavedTheme, ThemeStore, MAX_SAVED_THEMES};
pub use voice::{classify, KeywordSets, VoiceCommand};
