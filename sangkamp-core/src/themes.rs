//! Persistence for recently used custom playlist themes.
//!
//! The setup screen offers the last few free-text themes for quick reuse.
//! Stored as a small JSON file next to the config; a missing or corrupt file
//! is treated as an empty store rather than an error.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const LOG_TARGET: &str = "sangkamp::themes";

/// Most recent themes kept on disk.
pub const MAX_SAVED_THEMES: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedTheme {
    pub text: String,
    pub saved_at: DateTime<Utc>,
}

/// Write-through store of recent custom themes, newest first.
#[derive(Debug)]
pub struct ThemeStore {
    path: PathBuf,
    themes: Vec<SavedTheme>,
}

impl ThemeStore {
    /// Open the store backed by the given file, loading any saved themes.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let themes = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<SavedTheme>>(&content) {
                Ok(mut themes) => {
                    themes.truncate(MAX_SAVED_THEMES);
                    themes
                }
                Err(e) => {
                    warn!(target: LOG_TARGET, "Ignoring corrupt theme store {}: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self { path, themes }
    }

    /// Open the store at the default path (~/.config/sangkamp/.saved_themes.json)
    #[must_use]
    pub fn open_default() -> Self {
        Self::open(crate::paths::saved_themes_path())
    }

    #[must_use]
    pub fn themes(&self) -> &[SavedTheme] {
        &self.themes
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a theme as most recently used and persist the store.
    ///
    /// Re-adding an existing theme moves it to the front instead of
    /// duplicating it. Blank input is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store file cannot be written.
    pub fn add(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        self.themes
            .retain(|t| !t.text.eq_ignore_ascii_case(trimmed));
        self.themes.insert(
            0,
            SavedTheme {
                text: trimmed.to_string(),
                saved_at: Utc::now(),
            },
        );
        self.themes.truncate(MAX_SAVED_THEMES);
        self.save()
    }

    /// Remove a theme by text and persist the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store file cannot be written.
    pub fn remove(&mut self, text: &str) -> Result<()> {
        let before = self.themes.len();
        self.themes
            .retain(|t| !t.text.eq_ignore_ascii_case(text.trim()));
        if self.themes.len() == before {
            return Ok(());
        }
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.themes)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> ThemeStore {
        let path = std::env::temp_dir().join(format!("sangkamp-themes-{name}-{}.json", std::process::id()));
        let _ = fs::remove_file(&path);
        ThemeStore::open(path)
    }

    #[test]
    fn test_add_and_reload() {
        let mut store = temp_store("reload");
        store.add("80er synthpop").unwrap();
        store.add("Eurovision").unwrap();

        let reloaded = ThemeStore::open(store.path().to_path_buf());
        let texts: Vec<&str> = reloaded.themes().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Eurovision", "80er synthpop"]);

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_cap_keeps_five_most_recent() {
        let mut store = temp_store("cap");
        for i in 0..7 {
            store.add(format!("tema {i}")).unwrap();
        }
        assert_eq!(store.themes().len(), MAX_SAVED_THEMES);
        assert_eq!(store.themes()[0].text, "tema 6");
        assert_eq!(store.themes()[4].text, "tema 2");

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_re_adding_moves_to_front_without_duplicate() {
        let mut store = temp_store("dedupe");
        store.add("Jul").unwrap();
        store.add("Sommerhits").unwrap();
        store.add("jul").unwrap();

        let texts: Vec<&str> = store.themes().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["jul", "Sommerhits"]);

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_blank_and_remove() {
        let mut store = temp_store("remove");
        store.add("   ").unwrap();
        assert!(store.themes().is_empty());

        store.add("Film og tv").unwrap();
        store.remove("film og tv").unwrap();
        assert!(store.themes().is_empty());

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_corrupt_file_treated_as_empty() {
        let path = std::env::temp_dir().join(format!("sangkamp-themes-corrupt-{}.json", std::process::id()));
        fs::write(&path, "not json at all").unwrap();
        let store = ThemeStore::open(&path);
        assert!(store.themes().is_empty());
        let _ = fs::remove_file(path);
    }
}
