//! Timed phrase capture.
//!
//! Reads frames from a channel and waits for speech to begin. No speech
//! within the start timeout is a [`AssistantError::CaptureTimeout`] —
//! deliberately distinct from "speech present but unintelligible", which is
//! the recognizer's verdict, not ours. Once speech starts, the phrase ends
//! at a trailing-silence window or at the max phrase length.
//!
//! All timing is measured in received samples rather than wall-clock time,
//! which keeps behavior deterministic when tests feed synthetic frames.

use crate::audio::{AudioClip, AudioFrame, rms_energy};
use crate::config::CaptureConfig;
use crate::error::{AssistantError, Result};
use tokio::sync::mpsc;
use tracing::debug;

/// Captures one phrase at a time from a frame channel.
pub struct PhraseListener {
    energy_threshold: f32,
    start_timeout_ms: u32,
    max_phrase_ms: u32,
    min_silence_ms: u32,
}

impl PhraseListener {
    /// Create a listener from the capture configuration.
    #[must_use]
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            energy_threshold: config.energy_threshold,
            start_timeout_ms: config.start_timeout_ms,
            max_phrase_ms: config.max_phrase_ms,
            min_silence_ms: config.min_silence_ms,
        }
    }

    /// Capture one phrase from the channel.
    ///
    /// Trailing silence is included in the clip (recognizers cope better
    /// with a padded tail than a hard cut).
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::CaptureTimeout`] when no speech starts
    /// within the timeout, or when the channel closes before any speech.
    pub async fn capture(&self, frames: &mut mpsc::Receiver<AudioFrame>) -> Result<AudioClip> {
        let mut phrase: Vec<f32> = Vec::new();
        let mut sample_rate = 0u32;
        let mut in_speech = false;
        let mut waited: usize = 0;
        let mut trailing_silence: usize = 0;

        while let Some(frame) = frames.recv().await {
            if sample_rate == 0 {
                sample_rate = frame.sample_rate;
            }
            let start_timeout = samples_for(self.start_timeout_ms, sample_rate);
            let max_phrase = samples_for(self.max_phrase_ms, sample_rate);
            let silence_window = samples_for(self.min_silence_ms, sample_rate);

            let speaking = rms_energy(&frame.samples) > self.energy_threshold;

            if !in_speech {
                if speaking {
                    in_speech = true;
                    phrase.extend_from_slice(&frame.samples);
                    continue;
                }
                waited += frame.samples.len();
                if waited >= start_timeout {
                    return Err(AssistantError::CaptureTimeout(format!(
                        "no speech within {}ms",
                        self.start_timeout_ms
                    )));
                }
                continue;
            }

            phrase.extend_from_slice(&frame.samples);
            if speaking {
                trailing_silence = 0;
            } else {
                trailing_silence += frame.samples.len();
                if trailing_silence >= silence_window {
                    break;
                }
            }
            if phrase.len() >= max_phrase {
                debug!("phrase hit max length of {}ms", self.max_phrase_ms);
                break;
            }
        }

        if !in_speech {
            // Channel closed before any speech arrived.
            return Err(AssistantError::CaptureTimeout(
                "capture source ended before speech".into(),
            ));
        }

        debug!(
            "captured phrase: {} samples at {}Hz",
            phrase.len(),
            sample_rate
        );
        Ok(AudioClip {
            samples: phrase,
            sample_rate,
        })
    }
}

fn samples_for(ms: u32, sample_rate: u32) -> usize {
    (ms as usize * sample_rate as usize) / 1000
}
