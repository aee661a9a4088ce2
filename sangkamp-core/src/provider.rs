use crate::error::Result;
use crate::song::{Difficulty, GameSettings, Song};
use async_trait::async_trait;

/// Query parameters for generating a quiz playlist.
#[derive(Debug, Clone)]
pub struct PlaylistQuery {
    /// Decade filter label ("Alle" = mixed 1950-2024)
    pub decade: String,
    /// Genre filter label ("Alle" = popular hits)
    pub genre: String,
    /// Requested difficulty
    pub difficulty: Difficulty,
    /// Optional free-text theme constraint
    pub custom_category: Option<String>,
    /// Number of songs to generate
    pub count: usize,
}

impl PlaylistQuery {
    /// Build a query from the session settings and requested count.
    #[must_use]
    pub fn from_settings(settings: &GameSettings, count: usize) -> Self {
        Self {
            decade: settings.decade.clone(),
            genre: settings.genre.clone(),
            difficulty: settings.difficulty,
            custom_category: settings
                .custom_category
                .as_ref()
                .filter(|c| !c.trim().is_empty())
                .cloned(),
            count,
        }
    }

    /// True when the decade filter is the "everything" label.
    #[must_use]
    pub fn any_decade(&self) -> bool {
        self.decade.eq_ignore_ascii_case("alle")
    }

    /// True when the genre filter is the "everything" label.
    #[must_use]
    pub fn any_genre(&self) -> bool {
        self.genre.eq_ignore_ascii_case("alle")
    }
}

/// Trait for generative content providers.
///
/// The provider owns playlist composition and trivia text; the session
/// controller treats it as an opaque async request/response service and
/// never crashes on its failures.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Generate an ordered playlist for the given query.
    ///
    /// An empty list is a valid response (e.g. malformed upstream payload);
    /// the caller decides whether to refuse to start.
    async fn generate_playlist(&self, query: &PlaylistQuery) -> Result<Vec<Song>>;

    /// Fetch short trivia text for a release year. Best-effort.
    async fn trivia_for_year(&self, year: i32) -> Result<String>;

    /// Validate a user-entered custom category, returning a short
    /// confirmation text. Informational only.
    async fn validate_custom_category(&self, category: &str) -> Result<String>;
}
