use serde::{Deserialize, Serialize};

/// Difficulty rating attached to each song by the content provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Get the string identifier used in provider prompts and config.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One quiz track as produced by the content provider.
///
/// Songs are immutable after creation; player timelines hold clones of the
/// playlist entries and never mutate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Locally assigned identifier
    pub id: String,
    /// Track title
    pub title: String,
    /// Artist name(s)
    pub artist: String,
    /// Release year (the value players guess)
    pub year: i32,
    /// Genre label
    pub genre: String,
    /// Short fact shown on the reveal screen; also the trivia fallback
    pub fact: String,
    /// Provider-estimated difficulty
    pub difficulty: Difficulty,
    /// Opaque reference the media capability can load (e.g. a video id)
    #[serde(default)]
    pub media_ref: Option<String>,
}

impl Song {
    /// Create a new song
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            year,
            genre: String::new(),
            fact: String::new(),
            difficulty: Difficulty::Medium,
            media_ref: None,
        }
    }

    /// Set the genre label
    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    /// Set the reveal fact
    #[must_use]
    pub fn with_fact(mut self, fact: impl Into<String>) -> Self {
        self.fact = fact.into();
        self
    }

    /// Set the difficulty rating
    #[must_use]
    pub const fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the media reference
    #[must_use]
    pub fn with_media_ref(mut self, media_ref: impl Into<String>) -> Self {
        self.media_ref = Some(media_ref.into());
        self
    }
}

/// Game settings chosen during setup.
///
/// Passed by value to the content provider on game start; immutable for the
/// duration of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Decade filter label ("Alle" = no filter)
    pub decade: String,
    /// Genre filter label ("Alle" = no filter)
    pub genre: String,
    /// Requested difficulty
    pub difficulty: Difficulty,
    /// Optional free-text theme constraint
    #[serde(default)]
    pub custom_category: Option<String>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            decade: "Alle".to_string(),
            genre: "Alle".to_string(),
            difficulty: Difficulty::Medium,
            custom_category: None,
        }
    }
}
