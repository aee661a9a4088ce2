use crate::error::{CoreError, Result};
use crate::voice::KeywordSets;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SangkampConfig {
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_playlist_model")]
    pub playlist_model: String,
    #[serde(default = "default_trivia_model")]
    pub trivia_model: String,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_playlist_model() -> String {
    "gemini-3-pro-preview".into()
}

fn default_trivia_model() -> String {
    "gemini-3-flash-preview".into()
}

/// Round-loop pacing and playlist sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of songs requested per game
    #[serde(default = "default_playlist_count")]
    pub playlist_count: usize,
    /// Countdown start for the first round
    #[serde(default = "default_first_countdown")]
    pub first_countdown_secs: u32,
    /// Countdown start for every later round
    #[serde(default = "default_round_countdown")]
    pub round_countdown_secs: u32,
    /// Banner time before the first countdown
    #[serde(default = "default_first_intro_delay")]
    pub first_intro_delay_ms: u64,
    /// Banner time before later countdowns
    #[serde(default = "default_round_intro_delay")]
    pub round_intro_delay_ms: u64,
    /// Playback never starts before this offset into the track
    #[serde(default = "default_offset_min")]
    pub offset_min_secs: u64,
    /// Playback never starts at or after this offset
    #[serde(default = "default_offset_max")]
    pub offset_max_secs: u64,
}

const fn default_playlist_count() -> usize {
    12
}

const fn default_first_countdown() -> u32 {
    10
}

const fn default_round_countdown() -> u32 {
    5
}

const fn default_first_intro_delay() -> u64 {
    4000
}

const fn default_round_intro_delay() -> u64 {
    2500
}

const fn default_offset_min() -> u64 {
    30
}

const fn default_offset_max() -> u64 {
    90
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            playlist_count: default_playlist_count(),
            first_countdown_secs: default_first_countdown(),
            round_countdown_secs: default_round_countdown(),
            first_intro_delay_ms: default_first_intro_delay(),
            round_intro_delay_ms: default_round_intro_delay(),
            offset_min_secs: default_offset_min(),
            offset_max_secs: default_offset_max(),
        }
    }
}

/// Speech recognition language and host keyword lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(flatten)]
    pub keywords: KeywordSets,
}

fn default_language() -> String {
    "da-DK".into()
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            keywords: KeywordSets::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
}

impl SangkampConfig {
    /// Get the configuration directory path (~/.config/sangkamp/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/sangkamp/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from file or create template on first run
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed, or if
    /// required fields are missing.
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(&config_path, CONFIG_TEMPLATE)?;

            return Err(CoreError::ConfigNotFound { path: config_path });
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Validate required fields and pacing sanity.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is empty or the playback offset
    /// window is inverted.
    pub fn validate(&self) -> Result<()> {
        if self.gemini.api_key.is_empty() {
            return Err(CoreError::ConfigMissingField {
                field: "gemini.api_key".to_string(),
            });
        }
        if self.game.playlist_count == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "game.playlist_count must be at least 1".to_string(),
            });
        }
        if self.game.offset_min_secs >= self.game.offset_max_secs {
            return Err(CoreError::ConfigInvalid {
                message: "game.offset_min_secs must be below game.offset_max_secs".to_string(),
            });
        }
        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r##"# Sangkamp Configuration
# ~/.config/sangkamp/config.toml

[gemini]
# Required: Get an API key from https://aistudio.google.com/apikey
api_key = ""
base_url = "https://generativelanguage.googleapis.com/v1beta"
playlist_model = "gemini-3-pro-preview"
trivia_model = "gemini-3-flash-preview"

[game]
# Songs per game
playlist_count = 12
# Countdown seconds before the first / later rounds
first_countdown_secs = 10
round_countdown_secs = 5
# Round banner duration before the countdown starts
first_intro_delay_ms = 4000
round_intro_delay_ms = 2500
# Playback starts at a random offset within this window, so the intro of a
# track never gives the year away
offset_min_secs = 30
offset_max_secs = 90

[voice]
# Speech recognition language tag
language = "da-DK"
# Host keyword lists, matched case-insensitively as substrings
affirmative = ["korrekt", "rigtigt", "yes", "tæt på"]
negative = ["forkert", "fejl", "nej"]
next_round = ["næste", "videre"]
new_game = ["nyt spil"]

[logging]
# Also write logs to ~/.config/sangkamp/sangkamp.log
enabled = false
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_with_defaults() {
        let config: SangkampConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.game.playlist_count, 12);
        assert_eq!(config.game.first_countdown_secs, 10);
        assert_eq!(config.game.round_countdown_secs, 5);
        assert_eq!(config.voice.language, "da-DK");
        assert!(config.voice.keywords.affirmative.contains(&"korrekt".to_string()));
        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_template_fails_validation_without_api_key() {
        let config: SangkampConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::ConfigMissingField { .. }));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: SangkampConfig = toml::from_str("[gemini]\napi_key = \"k\"\n").unwrap();
        config.validate().unwrap();
        assert_eq!(config.game.offset_min_secs, 30);
        assert_eq!(config.game.offset_max_secs, 90);
        assert_eq!(config.gemini.playlist_model, "gemini-3-pro-preview");
    }

    #[test]
    fn test_inverted_offset_window_rejected() {
        let toml_src = "[gemini]\napi_key = \"k\"\n[game]\noffset_min_secs = 90\noffset_max_secs = 30\n";
        let config: SangkampConfig = toml::from_str(toml_src).unwrap();
        assert!(matches!(
            config.validate().unwrap_err(),
            CoreError::ConfigInvalid { .. }
        ));
    }
}
