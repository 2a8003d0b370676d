//! Speaker playback of synthesized speech via cpal.
//!
//! The synthesis adapter returns encoded MP3; this module decodes it with
//! symphonia and drives the samples through an output stream, blocking
//! until playback completes so responses never overlap.

use crate::config::AudioConfig;
use crate::error::{AssistantError, Result};
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use tracing::error;

/// Audio output to the system speakers.
pub struct SpeakerOutput {
    device: cpal::Device,
}

/// Progress tracker shared with the output callback.
struct PlayState {
    samples: Vec<f32>,
    position: usize,
    finished: bool,
}

impl SpeakerOutput {
    /// Open the configured output device (or the system default).
    ///
    /// # Errors
    ///
    /// Returns an error if no usable output device is available.
    pub fn open(config: &AudioConfig) -> Result<Self> {
        let host = cpal::default_host();

        let device = match config.output_device {
            Some(ref wanted) => host
                .output_devices()
                .map_err(|e| AssistantError::Audio(format!("cannot enumerate devices: {e}")))?
                .find(|d| {
                    d.description()
                        .ok()
                        .map(|desc| desc.name() == wanted)
                        .unwrap_or(false)
                })
                .ok_or_else(|| {
                    AssistantError::Audio(format!("output device '{wanted}' not found"))
                })?,
            None => host
                .default_output_device()
                .ok_or_else(|| AssistantError::Audio("no default output device".into()))?,
        };

        Ok(Self { device })
    }

    /// Decode an MP3 payload and play it to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or the output stream cannot be
    /// created.
    pub fn play_mp3(&self, bytes: &[u8]) -> Result<()> {
        let (samples, sample_rate) = decode_mp3(bytes)?;
        self.play(samples, sample_rate)
    }

    /// Play mono f32 samples, blocking until they have all been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream cannot be created or started.
    pub fn play(&self, samples: Vec<f32>, sample_rate: u32) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let stream_config = StreamConfig {
            channels: 1,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let state = Arc::new(Mutex::new(PlayState {
            samples,
            position: 0,
            finished: false,
        }));
        let callback_state = Arc::clone(&state);

        let stream = self
            .device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    let mut play = match callback_state.lock() {
                        Ok(guard) => guard,
                        Err(_) => return,
                    };
                    for sample in data.iter_mut() {
                        if play.position < play.samples.len() {
                            *sample = play.samples[play.position];
                            play.position += 1;
                        } else {
                            *sample = 0.0;
                            play.finished = true;
                        }
                    }
                },
                move |err| {
                    error!("audio output stream error: {err}");
                },
                None,
            )
            .map_err(|e| AssistantError::Audio(format!("failed to build output stream: {e}")))?;

        stream
            .play()
            .map_err(|e| AssistantError::Audio(format!("failed to start output stream: {e}")))?;

        loop {
            std::thread::sleep(std::time::Duration::from_millis(10));
            let play = state
                .lock()
                .map_err(|e| AssistantError::Audio(format!("playback lock poisoned: {e}")))?;
            if play.finished {
                break;
            }
        }

        drop(stream);
        Ok(())
    }

    /// List available output device names.
    ///
    /// # Errors
    ///
    /// Returns an error if devices cannot be enumerated.
    pub fn list_output_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .output_devices()
            .map_err(|e| AssistantError::Audio(format!("cannot enumerate devices: {e}")))?;

        Ok(devices
            .filter_map(|device| device.description().ok())
            .map(|desc| desc.name().to_owned())
            .collect())
    }
}

/// Decode an MP3 payload to mono f32 samples plus its sample rate.
///
/// # Errors
///
/// Returns an error if the payload cannot be probed or decoded.
pub fn decode_mp3(bytes: &[u8]) -> Result<(Vec<f32>, u32)> {
    use symphonia::core::audio::SampleBuffer;
    use symphonia::core::codecs::DecoderOptions;
    use symphonia::core::errors::Error as SymphError;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let cursor = std::io::Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.mime_type("audio/mpeg");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AssistantError::Audio(format!("failed to probe audio: {e}")))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| AssistantError::Audio("no default audio track".into()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut sample_rate = codec_params.sample_rate.unwrap_or(24_000);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AssistantError::Audio(format!("failed to create decoder: {e}")))?;

    let mut out: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(AssistantError::Audio(format!("audio read error: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Skip corrupt packets rather than abandoning the payload.
            Err(SymphError::DecodeError(_)) => continue,
            Err(e) => return Err(AssistantError::Audio(format!("audio decode error: {e}"))),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        let channels = spec.channels.count();

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);

        if channels <= 1 {
            out.extend_from_slice(buffer.samples());
        } else {
            out.extend(
                buffer
                    .samples()
                    .chunks_exact(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }
    }

    if out.is_empty() {
        return Err(AssistantError::Audio("decoded audio is empty".into()));
    }

    Ok((out, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = decode_mp3(&[0x00, 0x01, 0x02, 0x03]);
        assert!(result.is_err());
    }

    #[test]
    fn empty_payload_fails_to_decode() {
        assert!(decode_mp3(&[]).is_err());
    }
}
