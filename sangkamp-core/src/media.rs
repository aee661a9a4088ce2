//! Platform media capability traits.
//!
//! Audio playback and speech recognition are platform services; the session
//! controller only sees these seams. Implementations live in the host crates
//! (a real player/recognizer in a browser-backed host, console stand-ins in
//! the terminal host, mocks in tests).

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

/// Trait for audio/video playback of a track reference.
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Get the player name
    fn name(&self) -> &'static str;

    /// Load the referenced track and start playing at the given offset.
    async fn load_and_play(&self, media_ref: &str, start_offset: Duration) -> Result<()>;

    /// Stop playback.
    ///
    /// Must tolerate being called when nothing is loaded: repeated or
    /// spurious stops are a no-op, never a fault.
    async fn stop(&self) -> Result<()>;
}

/// Trait for a continuous speech-to-text capability.
///
/// `start` opens a fresh recognition stream. The stream ends (the receiver
/// yields `None`) whenever the underlying engine naturally stops; the
/// [`VoiceListener`](crate::listener::VoiceListener) restarts it for as long
/// as a session is running.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Get the recognizer name
    fn name(&self) -> &'static str;

    /// Open a fresh recognition stream of transcribed text fragments.
    async fn start(&self) -> Result<mpsc::Receiver<String>>;
}
