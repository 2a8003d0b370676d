//! Per-session assistant state.
//!
//! One record per UI session, mutated once per dispatch cycle. There are no
//! ambient globals: the record is owned by the coordinator and passed by
//! reference, and nothing persists across sessions.

use crate::intent::Response;

/// Mutable state for one assistant session.
///
/// Display fields are cleared at the start of each capture cycle so a stale
/// response never lingers while a new request is in flight. The pending
/// audio payload is read-then-clear: [`SessionState::take_pending_audio`]
/// hands it to the presentation layer exactly once.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Normalized transcript of the most recent command.
    pub last_command: String,
    /// Speakable form of the most recent response.
    pub response_speech: String,
    /// Display form of the most recent response (may contain a link).
    pub response_display: String,
    /// Whether the session greeting has been delivered.
    pub greeted: bool,
    /// Whether a capture is currently in progress.
    pub recording_active: bool,
    /// Encoded audio for the most recent response, consumed on first read.
    pending_audio: Option<Vec<u8>>,
}

impl SessionState {
    /// Create a fresh session record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new capture cycle: clear the display fields and any audio
    /// payload left unconsumed from the previous cycle.
    pub fn begin_cycle(&mut self) {
        self.last_command.clear();
        self.response_speech.clear();
        self.response_display.clear();
        self.pending_audio = None;
        self.recording_active = true;
    }

    /// Record the outcome of a dispatch cycle.
    pub fn finish_cycle(&mut self, command: &str, response: &Response, audio: Option<Vec<u8>>) {
        self.last_command = command.to_owned();
        self.response_speech = response.speech.clone();
        self.response_display = response.display.clone();
        self.pending_audio = audio.filter(|bytes| !bytes.is_empty());
        self.recording_active = false;
    }

    /// Take the pending audio payload, leaving the field empty.
    ///
    /// At most one payload exists at a time; after this returns the field
    /// stays empty until the next dispatch cycle stores a new one.
    pub fn take_pending_audio(&mut self) -> Option<Vec<u8>> {
        self.pending_audio.take()
    }

    /// Whether a payload is waiting without consuming it.
    #[must_use]
    pub fn has_pending_audio(&self) -> bool {
        self.pending_audio.is_some()
    }
}
