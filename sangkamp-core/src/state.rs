//! Game session state and pure transition helpers.
//!
//! The [`GameState`] value is owned exclusively by the session controller and
//! replaced wholesale on every transition. The helpers here take the current
//! state by reference and return the successor value; they never mutate in
//! place, so a concurrent reader can never observe a half-applied transition.

use crate::player::Player;
use crate::song::{GameSettings, Song};
use serde::{Deserialize, Serialize};

/// Phase of the round loop.
///
/// `setup → intro → countdown → playing → placing → result → (intro | game_over)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Initial phase; no session state exists yet
    #[default]
    Setup,
    /// Round banner is showing
    Intro,
    /// Numeric countdown before playback
    Countdown,
    /// Mystery track is playing; waiting for a buzz-in
    Playing,
    /// A team buzzed in; waiting for the correct/incorrect verdict
    Placing,
    /// Reveal screen with year and trivia
    Result,
    /// Terminal until explicit reset
    GameOver,
}

impl GameStatus {
    /// Get the string identifier used in logs and events.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Intro => "intro",
            Self::Countdown => "countdown",
            Self::Playing => "playing",
            Self::Placing => "placing",
            Self::Result => "result",
            Self::GameOver => "game_over",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root aggregate for one game session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    pub settings: GameSettings,
    pub current_player_index: usize,
    /// The team currently privileged to guess; `None` outside placing/result
    pub active_player_index: Option<usize>,
    /// 1-based round number
    pub current_round: u32,
    pub status: GameStatus,
    /// The song for the active round; equals `playlist[current_track_index]`
    /// whenever defined
    pub current_card: Option<Song>,
    /// Fixed once fetched
    pub playlist: Vec<Song>,
    pub current_track_index: usize,
    pub last_guess_correct: Option<bool>,
    pub countdown_value: u32,
    /// Trivia text for the current reveal, if fetched
    pub trivia: Option<String>,
}

impl GameState {
    /// Successor state for a successful game start: first round intro.
    #[must_use]
    pub fn started(
        &self,
        players: Vec<Player>,
        playlist: Vec<Song>,
        settings: GameSettings,
    ) -> Self {
        let current_card = playlist.first().cloned();
        Self {
            players,
            settings,
            current_player_index: 0,
            active_player_index: None,
            current_round: 1,
            status: GameStatus::Intro,
            current_card,
            playlist,
            current_track_index: 0,
            last_guess_correct: None,
            countdown_value: 0,
            trivia: None,
        }
    }

    /// Successor state entering the countdown phase.
    #[must_use]
    pub fn counting_down(&self, from: u32) -> Self {
        Self {
            status: GameStatus::Countdown,
            countdown_value: from,
            ..self.clone()
        }
    }

    /// Successor state for one countdown tick.
    #[must_use]
    pub fn ticked(&self) -> Self {
        Self {
            countdown_value: self.countdown_value.saturating_sub(1),
            ..self.clone()
        }
    }

    /// Successor state entering playback.
    #[must_use]
    pub fn now_playing(&self) -> Self {
        Self {
            status: GameStatus::Playing,
            ..self.clone()
        }
    }

    /// Successor state after a team buzzed in.
    #[must_use]
    pub fn buzzed_in(&self, player_index: usize) -> Self {
        Self {
            status: GameStatus::Placing,
            active_player_index: Some(player_index),
            ..self.clone()
        }
    }

    /// Successor state after the guess verdict, with the (possibly updated)
    /// player list and the trivia text for the reveal screen.
    #[must_use]
    pub fn judged(&self, players: Vec<Player>, correct: bool, trivia: String) -> Self {
        Self {
            players,
            status: GameStatus::Result,
            last_guess_correct: Some(correct),
            trivia: Some(trivia),
            ..self.clone()
        }
    }

    /// Successor state for advancing past the reveal screen.
    ///
    /// Transitions directly to game over when the playlist is exhausted,
    /// otherwise to the next round's intro with per-round fields cleared.
    #[must_use]
    pub fn advanced(&self) -> Self {
        let next_index = self.current_track_index + 1;
        if next_index >= self.playlist.len() {
            return Self {
                status: GameStatus::GameOver,
                active_player_index: None,
                ..self.clone()
            };
        }
        Self {
            status: GameStatus::Intro,
            current_track_index: next_index,
            current_round: self.current_round + 1,
            current_card: self.playlist.get(next_index).cloned(),
            active_player_index: None,
            last_guess_correct: None,
            trivia: None,
            ..self.clone()
        }
    }

    /// The winning player: highest score, first-encountered on ties.
    #[must_use]
    pub fn winner(&self) -> Option<&Player> {
        let mut best: Option<&Player> = None;
        for player in &self.players {
            match best {
                Some(current) if player.score <= current.score => {}
                _ => best = Some(player),
            }
        }
        best
    }

    /// True while a started session exists (anything but setup).
    #[must_use]
    pub fn in_session(&self) -> bool {
        self.status != GameStatus::Setup
    }
}
