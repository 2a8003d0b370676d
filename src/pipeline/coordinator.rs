//! Coordinator for the capture → transcribe → dispatch → speak cycle.
//!
//! One cycle runs at a time — the coordinator takes `&mut self`, so a new
//! command cannot start while another is in flight, and responses land in
//! the session record in command order. Every adapter failure degrades to a
//! spoken/displayed message; the only clean exit is a user-issued stop.

use crate::audio::phrase::PhraseListener;
use crate::audio::{AudioClip, AudioFrame};
use crate::config::AssistantConfig;
use crate::error::{AssistantError, Result};
use crate::intent::{IntentDispatcher, Response};
use crate::lookup::weather_provider;
use crate::session::SessionState;
use crate::stt::{CloudRecognizer, Transcriber};
use crate::tts::{CloudSpeech, Synthesizer};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use wren_lookup::EncyclopediaClient;

/// Reply when the capture window elapsed without speech.
pub const NO_SPEECH_REPLY: &str = "I didn't hear anything. Please try again.";
/// Reply when speech was captured but the recognizer had no hypothesis.
pub const UNINTELLIGIBLE_REPLY: &str = "Sorry, I could not understand what you said.";
/// Reply when the recognizer request itself failed.
pub const STT_FAILURE_REPLY: &str = "Speech recognition request failed. Please try again.";

/// Result of one dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle produced a response; the session continues.
    Completed,
    /// The user ended the session; no further cycles run.
    Terminated,
}

/// Owns the pipeline stages and the session record.
pub struct Assistant {
    listener: PhraseListener,
    transcriber: Arc<dyn Transcriber>,
    synthesizer: Arc<dyn Synthesizer>,
    dispatcher: IntentDispatcher,
    session: SessionState,
    greeting: String,
    finished: bool,
}

impl Assistant {
    /// Build an assistant with production adapters from config.
    ///
    /// A missing weather API key degrades to an unconfigured provider
    /// rather than failing here.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built or a configured
    /// STT API key fails to resolve.
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let transcriber = Arc::new(CloudRecognizer::new(
            &config.stt,
            &config.conversation.wake_word,
        )?);
        let synthesizer = Arc::new(CloudSpeech::new(&config.tts)?);

        let encyclopedia = Arc::new(
            EncyclopediaClient::new(&config.lookup)
                .map_err(|e| AssistantError::Lookup(e.to_string()))?,
        );
        let weather = weather_provider(&config.lookup)
            .map_err(|e| AssistantError::Lookup(e.to_string()))?;
        let dispatcher =
            IntentDispatcher::new(encyclopedia, weather, config.lookup.summary_sentences);

        Ok(Self::with_adapters(config, transcriber, synthesizer, dispatcher))
    }

    /// Build an assistant over explicit adapters (used by tests).
    pub fn with_adapters(
        config: &AssistantConfig,
        transcriber: Arc<dyn Transcriber>,
        synthesizer: Arc<dyn Synthesizer>,
        dispatcher: IntentDispatcher,
    ) -> Self {
        Self {
            listener: PhraseListener::new(&config.capture),
            transcriber,
            synthesizer,
            dispatcher,
            session: SessionState::new(),
            greeting: config.conversation.greeting.clone(),
            finished: false,
        }
    }

    /// The session record (presentation layer reads this).
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Mutable session access, e.g. to take the pending audio payload.
    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    /// Speak the session greeting once.
    pub async fn greet(&mut self) {
        if self.session.greeted {
            return;
        }
        self.session.begin_cycle();
        let greeting = Response::plain(self.greeting.clone());
        self.respond("", &greeting).await;
        self.session.greeted = true;
    }

    /// Run one timed capture cycle: wait for a phrase on `frames`, then
    /// transcribe, dispatch, and synthesize the reply.
    ///
    /// Capture timeouts and recognizer failures are absorbed into
    /// user-facing replies; after a stop command every further call
    /// returns [`CycleOutcome::Terminated`] without processing.
    ///
    /// # Errors
    ///
    /// Returns an error only for unrecoverable audio transport failures.
    pub async fn run_cycle(
        &mut self,
        frames: &mut mpsc::Receiver<AudioFrame>,
    ) -> Result<CycleOutcome> {
        if self.finished {
            return Ok(CycleOutcome::Terminated);
        }
        self.session.begin_cycle();

        let clip = match self.listener.capture(frames).await {
            Ok(clip) => clip,
            Err(AssistantError::CaptureTimeout(reason)) => {
                debug!("capture timed out: {reason}");
                self.respond("", &Response::plain(NO_SPEECH_REPLY)).await;
                return Ok(CycleOutcome::Completed);
            }
            Err(e) => return Err(e),
        };

        self.transcribe_and_dispatch(clip).await
    }

    /// Process a clip drained from a streaming recording (push-to-talk).
    pub async fn process_recording(&mut self, clip: AudioClip) -> Result<CycleOutcome> {
        if self.finished {
            return Ok(CycleOutcome::Terminated);
        }
        self.session.begin_cycle();
        self.transcribe_and_dispatch(clip).await
    }

    /// Run timed cycles until the user stops the session or the frame
    /// source closes.
    ///
    /// # Errors
    ///
    /// Propagates unrecoverable failures from [`Assistant::run_cycle`].
    pub async fn run(&mut self, frames: &mut mpsc::Receiver<AudioFrame>) -> Result<()> {
        self.greet().await;
        loop {
            if self.run_cycle(frames).await? == CycleOutcome::Terminated {
                return Ok(());
            }
        }
    }

    async fn transcribe_and_dispatch(&mut self, clip: AudioClip) -> Result<CycleOutcome> {
        let transcript = match self.transcriber.transcribe(&clip).await {
            Ok(t) => t,
            Err(AssistantError::Unintelligible(reason)) => {
                debug!("unintelligible audio: {reason}");
                self.respond("", &Response::plain(UNINTELLIGIBLE_REPLY)).await;
                return Ok(CycleOutcome::Completed);
            }
            Err(e) => {
                warn!("transcription failed: {e}");
                self.respond("", &Response::plain(STT_FAILURE_REPLY)).await;
                return Ok(CycleOutcome::Completed);
            }
        };

        let outcome = self.dispatcher.dispatch(&transcript.text).await;
        self.respond(&transcript.text, &outcome.response).await;

        if outcome.terminate {
            self.finished = true;
            info!("session ended by user command");
            return Ok(CycleOutcome::Terminated);
        }
        Ok(CycleOutcome::Completed)
    }

    /// Synthesize the reply and store the cycle outcome in the session.
    /// Synthesis failure degrades to a text-only response.
    async fn respond(&mut self, command: &str, response: &Response) {
        let audio = match self.synthesizer.synthesize(&response.speech).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("synthesis failed, responding with text only: {e}");
                None
            }
        };
        self.session.finish_cycle(command, response, audio);
    }
}
