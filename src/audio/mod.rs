//! Audio capture, recording, and playback.
//!
//! Microphone frames come in via `cpal` at the device's native rate and are
//! downmixed/downsampled to 16 kHz mono before anything downstream sees
//! them. Phrase capture itself is frame-source agnostic: it reads from a
//! channel, so tests feed synthetic frames.

pub mod mic;
pub mod phrase;
pub mod playback;
pub mod recorder;

use crate::error::{AssistantError, Result};

/// A chunk of mono audio samples from a capture source.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Mono f32 samples in \[-1, 1\].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

/// A complete captured phrase, ready for transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Concatenated mono samples for the whole phrase.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioClip {
    /// Duration of the clip in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Compute RMS energy of audio samples.
#[must_use]
pub fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Encode f32 mono PCM as an in-memory 16-bit WAV file for upload to the
/// recognizer.
///
/// # Errors
///
/// Returns an error if WAV encoding fails.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| AssistantError::Audio(format!("failed to start WAV writer: {e}")))?;
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
            writer
                .write_sample(value)
                .map_err(|e| AssistantError::Audio(format!("failed to write WAV sample: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| AssistantError::Audio(format!("failed to finalize WAV: {e}")))?;
    }
    Ok(cursor.into_inner())
}
