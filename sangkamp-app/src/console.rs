//! Console stand-ins for the platform media capabilities.
//!
//! Plain stdin lines play the role of recognized speech, and playback is
//! narrated to the log instead of producing audio. The session controller
//! and listener only ever see the core traits.

use async_trait::async_trait;
use sangkamp_core::error::Result;
use sangkamp_core::{MediaPlayer, SpeechRecognizer};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::info;

const LOG_TARGET: &str = "sangkamp::console";

/// Speech recognizer fed by stdin lines.
#[derive(Default)]
pub struct SpeechFeed {
    sender: Mutex<Option<mpsc::Sender<String>>>,
}

impl SpeechFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one line as a recognized fragment.
    ///
    /// Dropped silently while no recognition stream is open, matching a real
    /// engine that hears nothing when the microphone is closed.
    pub async fn push(&self, fragment: impl Into<String>) {
        let guard = self.sender.lock().await;
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(fragment.into()).await;
        }
    }
}

#[async_trait]
impl SpeechRecognizer for SpeechFeed {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn start(&self) -> Result<mpsc::Receiver<String>> {
        let (tx, rx) = mpsc::channel(32);
        *self.sender.lock().await = Some(tx);
        Ok(rx)
    }
}

/// Playback stand-in that narrates what a real player would do.
#[derive(Default)]
pub struct ConsolePlayer {
    current: Mutex<Option<String>>,
}

#[async_trait]
impl MediaPlayer for ConsolePlayer {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn load_and_play(&self, media_ref: &str, start_offset: Duration) -> Result<()> {
        info!(
            target: LOG_TARGET,
            "[play] {} from {}s in", media_ref, start_offset.as_secs()
        );
        *self.current.lock().await = Some(media_ref.to_string());
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        // stop with nothing loaded is a no-op by contract
        if let Some(media_ref) = self.current.lock().await.take() {
            info!(target: LOG_TARGET, "[stop] {}", media_ref);
        }
        Ok(())
    }
}
