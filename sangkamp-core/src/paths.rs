//! Path constants for configuration and persisted state files.

use std::path::PathBuf;

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "sangkamp";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the saved custom-theme list (prefixed with . for hidden)
pub const SAVED_THEMES_FILE_NAME: &str = ".saved_themes.json";

/// The name of the optional log file
pub const LOG_FILE_NAME: &str = "sangkamp.log";

/// Get the configuration directory path (~/.config/sangkamp/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the config file path (~/.config/sangkamp/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the saved themes file path (`~/.config/sangkamp/.saved_themes.json`)
#[must_use]
pub fn saved_themes_path() -> PathBuf {
    config_dir().join(SAVED_THEMES_FILE_NAME)
}

/// Get the log file path (`~/.config/sangkamp/sangkamp.log`)
#[must_use]
pub fn log_file_path() -> PathBuf {
    config_dir().join(LOG_FILE_NAME)
}
