use crate::song::Song;
use serde::{Deserialize, Serialize};

/// Points awarded for a correct year guess.
pub const POINTS_PER_CORRECT: u32 = 12;

/// One team participating in a session.
///
/// Mutated only through [`Player::award`]; everything else is read-only state
/// owned by the session controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Locally assigned identifier
    pub id: String,
    /// Display name, matched case-insensitively against speech fragments
    pub name: String,
    /// Accumulated score
    pub score: u32,
    /// Correctly guessed songs, kept sorted ascending by year
    pub timeline: Vec<Song>,
}

impl Player {
    /// Create a new player with zero score and an empty timeline
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            score: 0,
            timeline: Vec::new(),
        }
    }

    /// Award a correct guess: fixed points plus a sorted timeline insertion.
    ///
    /// The timeline stays sorted ascending by year. Insertion is stable:
    /// songs sharing a year keep their relative insertion order.
    pub fn award(&mut self, song: Song) {
        self.score += POINTS_PER_CORRECT;
        let pos = self.timeline.partition_point(|s| s.year <= song.year);
        self.timeline.insert(pos, song);
    }

    /// Check whether a lowercased speech fragment contains this player's name.
    #[must_use]
    pub fn matches_fragment(&self, fragment: &str) -> bool {
        fragment.contains(&self.name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str, year: i32) -> Song {
        Song::new(id, format!("Song {id}"), "Artist", year)
    }

    #[test]
    fn test_award_increments_score_by_fixed_amount() {
        let mut player = Player::new("p1", "Hold 1");
        player.award(song("a", 1990));
        player.award(song("b", 1985));
        player.award(song("c", 2001));
        assert_eq!(player.score, 3 * POINTS_PER_CORRECT);
    }

    #[test]
    fn test_timeline_sorted_ascending_after_insertions() {
        let mut player = Player::new("p1", "Hold 1");
        for year in [1999, 1972, 2015, 1984, 2003, 1972] {
            player.award(song(&year.to_string(), year));
        }
        let years: Vec<i32> = player.timeline.iter().map(|s| s.year).collect();
        let mut sorted = years.clone();
        sorted.sort_unstable();
        assert_eq!(years, sorted);
    }

    #[test]
    fn test_timeline_ties_keep_insertion_order() {
        let mut player = Player::new("p1", "Hold 1");
        player.award(song("first", 1995));
        player.award(song("second", 1995));
        player.award(song("third", 1995));
        let ids: Vec<&str> = player.timeline.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_matches_fragment_case_insensitive_substring() {
        let player = Player::new("p1", "Hold 1");
        assert!(player.matches_fragment("hold 1 er klar"));
        assert!(player.matches_fragment("det er hold 1"));
        assert!(!player.matches_fragment("hold to her"));
    }
}
