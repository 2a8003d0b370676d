//! Streaming capture for push-to-talk recording.
//!
//! Frames arrive asynchronously from a producer (microphone task, remote
//! stream) and accumulate while recording is active. One mutex guards an
//! explicit idle/recording state — start and stop are signals, not flags
//! that anyone polls — so concurrent frame delivery cannot race with the
//! drain on stop.

use crate::audio::AudioClip;
use std::sync::Mutex;
use tracing::debug;

/// Explicit recorder state. Frames pushed while idle are discarded.
#[derive(Debug)]
enum RecorderState {
    Idle,
    Recording {
        samples: Vec<f32>,
        sample_rate: u32,
    },
}

/// Accumulates streamed audio between an explicit start and stop.
///
/// Share via `Arc`: producers call [`StreamingRecorder::push`], the
/// controlling side calls [`StreamingRecorder::start`] and
/// [`StreamingRecorder::stop`]. The buffer is unbounded for the duration of
/// one recording; stop drains and resets it atomically.
#[derive(Debug)]
pub struct StreamingRecorder {
    state: Mutex<RecorderState>,
}

impl Default for StreamingRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingRecorder {
    /// Create a recorder in the idle state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RecorderState::Idle),
        }
    }

    /// Begin recording, discarding anything a previous recording left
    /// behind.
    pub fn start(&self, sample_rate: u32) {
        let mut state = self.lock();
        *state = RecorderState::Recording {
            samples: Vec::new(),
            sample_rate,
        };
        debug!("streaming recorder started at {sample_rate}Hz");
    }

    /// Append samples to the active recording. A no-op while idle.
    pub fn push(&self, samples: &[f32]) {
        let mut state = self.lock();
        if let RecorderState::Recording { samples: buffer, .. } = &mut *state {
            buffer.extend_from_slice(samples);
        }
    }

    /// Stop recording and drain the accumulated buffer.
    ///
    /// Returns `None` if the recorder was idle. The state returns to idle
    /// either way, so a second stop yields nothing.
    pub fn stop(&self) -> Option<AudioClip> {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, RecorderState::Idle) {
            RecorderState::Idle => None,
            RecorderState::Recording {
                samples,
                sample_rate,
            } => {
                debug!("streaming recorder stopped: {} samples", samples.len());
                Some(AudioClip {
                    samples,
                    sample_rate,
                })
            }
        }
    }

    /// Whether a recording is in progress.
    pub fn is_recording(&self) -> bool {
        matches!(*self.lock(), RecorderState::Recording { .. })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecorderState> {
        // A poisoned lock means a producer panicked mid-push; the buffer
        // contents are still coherent samples, so keep going.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
