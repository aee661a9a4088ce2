//! Background loop feeding recognized speech into the session controller.

use crate::media::SpeechRecognizer;
use crate::session::SessionController;
use crate::state::GameStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "sangkamp::listener";

/// Bridges a [`SpeechRecognizer`] stream to the session controller.
///
/// While the session sits in setup the listener parks and keeps the
/// microphone closed. Once a game is running it opens a recognition stream
/// and forwards every fragment; when the stream ends naturally it is
/// reopened, so recognition stays continuous for the whole session.
pub struct VoiceListener {
    controller: Arc<SessionController>,
    recognizer: Arc<dyn SpeechRecognizer>,
    cancel_token: CancellationToken,
}

impl VoiceListener {
    #[must_use]
    pub fn new(
        controller: Arc<SessionController>,
        recognizer: Arc<dyn SpeechRecognizer>,
    ) -> Arc<Self> {
        let cancel_token = controller.cancel_token().child_token();
        Arc::new(Self {
            controller,
            recognizer,
            cancel_token,
        })
    }

    /// Start the listener loop as a background task.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
            info!(target: LOG_TARGET, "Voice listener stopped");
        })
    }

    async fn run(&self) {
        let mut events = self.controller.subscribe();

        loop {
            if self.cancel_token.is_cancelled() {
                return;
            }

            if self.controller.status().await == GameStatus::Setup {
                // park until the session leaves setup
                tokio::select! {
                    () = self.cancel_token.cancelled() => return,
                    event = events.recv() => {
                        match event {
                            Ok(_) | Err(RecvError::Lagged(_)) => {}
                            Err(RecvError::Closed) => return,
                        }
                    }
                }
                continue;
            }

            match self.recognizer.start().await {
                Ok(fragments) => {
                    debug!(
                        target: LOG_TARGET,
                        "Recognition stream opened ({})",
                        self.recognizer.name()
                    );
                    self.pump(fragments).await;
                }
                Err(e) => {
                    warn!(target: LOG_TARGET, "Failed to open recognition stream: {}", e);
                    tokio::select! {
                        () = self.cancel_token.cancelled() => return,
                        () = tokio::time::sleep(Duration::from_secs(1)) => {}
                    }
                }
            }
        }
    }

    /// Forward fragments until the stream ends or the listener is cancelled.
    async fn pump(&self, mut fragments: tokio::sync::mpsc::Receiver<String>) {
        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => return,
                fragment = fragments.recv() => {
                    let Some(text) = fragment else {
                        debug!(target: LOG_TARGET, "Recognition stream ended, reopening");
                        return;
                    };
                    debug!(target: LOG_TARGET, "Heard: {}", text);
                    self.controller.handle_utterance(&text).await;
                }
            }
        }
    }
}
