//! Classification of recognized speech fragments.
//!
//! Fragments are classified against the current state only: each state maps
//! to one pure predicate, and everything else is ignored. The controller
//! applies the resulting [`VoiceCommand`]; nothing in here touches state.

use crate::state::{GameState, GameStatus};
use serde::{Deserialize, Serialize};

/// Action derived from one recognized fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    /// A team name was heard while the track was playing
    BuzzIn(usize),
    /// The host ruled the guess correct (`true`) or incorrect (`false`)
    Judge(bool),
    /// Advance past the reveal screen
    NextRound,
    /// Start over from the game-over screen
    NewGame,
    /// Fragment is not meaningful in the current state
    Ignore,
}

/// Keyword lists used by the per-state classifiers.
///
/// Defaults are the Danish host vocabulary; all lists are configurable under
/// `[voice]` in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSets {
    #[serde(default = "default_affirmative")]
    pub affirmative: Vec<String>,
    #[serde(default = "default_negative")]
    pub negative: Vec<String>,
    #[serde(default = "default_next_round")]
    pub next_round: Vec<String>,
    #[serde(default = "default_new_game")]
    pub new_game: Vec<String>,
}

fn default_affirmative() -> Vec<String> {
    ["korrekt", "rigtigt", "yes", "tæt på"]
        .map(String::from)
        .to_vec()
}

fn default_negative() -> Vec<String> {
    ["forkert", "fejl", "nej"].map(String::from).to_vec()
}

fn default_next_round() -> Vec<String> {
    ["næste", "videre"].map(String::from).to_vec()
}

fn default_new_game() -> Vec<String> {
    ["nyt spil"].map(String::from).to_vec()
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self {
            affirmative: default_affirmative(),
            negative: default_negative(),
            next_round: default_next_round(),
            new_game: default_new_game(),
        }
    }
}

fn contains_any(fragment: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| fragment.contains(k.as_str()))
}

/// Classify a recognized fragment against the current state.
///
/// Matching is case-insensitive substring matching. Buzz-in resolves to the
/// first matching player in list order; in placing the affirmative check is
/// evaluated before the negative one, so a fragment matching both rules the
/// guess correct.
#[must_use]
pub fn classify(state: &GameState, fragment: &str, keywords: &KeywordSets) -> VoiceCommand {
    let fragment = fragment.to_lowercase();
    match state.status {
        GameStatus::Playing if state.active_player_index.is_none() => state
            .players
            .iter()
            .position(|p| p.matches_fragment(&fragment))
            .map_or(VoiceCommand::Ignore, VoiceCommand::BuzzIn),
        GameStatus::Placing => {
            if contains_any(&fragment, &keywords.affirmative) {
                VoiceCommand::Judge(true)
            } else if contains_any(&fragment, &keywords.negative) {
                VoiceCommand::Judge(false)
            } else {
                VoiceCommand::Ignore
            }
        }
        GameStatus::Result if contains_any(&fragment, &keywords.next_round) => {
            VoiceCommand::NextRound
        }
        GameStatus::GameOver if contains_any(&fragment, &keywords.new_game) => {
            VoiceCommand::NewGame
        }
        _ => VoiceCommand::Ignore,
    }
}
