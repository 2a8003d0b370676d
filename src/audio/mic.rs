//! Microphone frame source using cpal.
//!
//! Opens the input device at its native configuration for maximum
//! compatibility, then downmixes to mono and downsamples to the configured
//! pipeline rate in software before handing frames to the channel.

use crate::audio::AudioFrame;
use crate::config::AudioConfig;
use crate::error::{AssistantError, Result};
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Microphone capture that feeds [`AudioFrame`]s into a channel.
pub struct MicSource {
    device: cpal::Device,
    stream_config: StreamConfig,
    pipeline_rate: u32,
}

impl MicSource {
    /// Open the configured input device (or the system default).
    ///
    /// # Errors
    ///
    /// Returns an error if no usable input device is available.
    pub fn open(config: &AudioConfig) -> Result<Self> {
        let host = cpal::default_host();

        let device = match config.input_device {
            Some(ref wanted) => host
                .input_devices()
                .map_err(|e| AssistantError::Audio(format!("cannot enumerate devices: {e}")))?
                .find(|d| {
                    d.description()
                        .ok()
                        .map(|desc| desc.name() == wanted)
                        .unwrap_or(false)
                })
                .ok_or_else(|| {
                    AssistantError::Audio(format!("input device '{wanted}' not found"))
                })?,
            None => host
                .default_input_device()
                .ok_or_else(|| AssistantError::Audio("no default input device".into()))?,
        };

        let default_config = device
            .default_input_config()
            .map_err(|e| AssistantError::Audio(format!("no default input config: {e}")))?;

        let stream_config = StreamConfig {
            channels: default_config.channels(),
            sample_rate: default_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let device_name = device
            .description()
            .map(|d| d.name().to_owned())
            .unwrap_or_else(|_| "<unknown>".into());
        info!(
            "microphone: {device_name} ({}Hz, {} channels -> {}Hz mono)",
            stream_config.sample_rate,
            stream_config.channels,
            config.input_sample_rate
        );

        Ok(Self {
            device,
            stream_config,
            pipeline_rate: config.input_sample_rate,
        })
    }

    /// Run the capture stream, sending frames until the token is cancelled.
    ///
    /// The cpal callback runs on the audio thread, so frames are handed off
    /// with `try_send`; a full channel drops the frame rather than blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if the input stream cannot be created or started.
    pub async fn run(
        &self,
        tx: mpsc::Sender<AudioFrame>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let native_rate = self.stream_config.sample_rate;
        let channels = self.stream_config.channels;
        let pipeline_rate = self.pipeline_rate;

        let stream = self
            .device
            .build_input_stream(
                &self.stream_config,
                move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                    let mono = downmix(data, channels);
                    let samples = if native_rate == pipeline_rate {
                        mono
                    } else {
                        resample(&mono, native_rate, pipeline_rate)
                    };

                    let frame = AudioFrame {
                        samples,
                        sample_rate: pipeline_rate,
                    };
                    if tx.try_send(frame).is_err() {
                        debug!("frame channel full, dropping frame");
                    }
                },
                move |err| {
                    error!("audio input stream error: {err}");
                },
                None,
            )
            .map_err(|e| AssistantError::Audio(format!("failed to build input stream: {e}")))?;

        stream
            .play()
            .map_err(|e| AssistantError::Audio(format!("failed to start input stream: {e}")))?;

        cancel.cancelled().await;
        drop(stream);
        debug!("microphone capture stopped");
        Ok(())
    }

    /// List available input device names.
    ///
    /// # Errors
    ///
    /// Returns an error if devices cannot be enumerated.
    pub fn list_input_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| AssistantError::Audio(format!("cannot enumerate devices: {e}")))?;

        Ok(devices
            .filter_map(|device| device.description().ok())
            .map(|desc| desc.name().to_owned())
            .collect())
    }
}

/// Downmix interleaved multi-channel audio to mono by averaging channels.
fn downmix(data: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    let ch = usize::from(channels);
    data.chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

/// Linear-interpolation resampler.
///
/// Adequate for speech capture (48 kHz -> 16 kHz): speech energy sits well
/// below the 8 kHz Nyquist limit of the target rate.
fn resample(samples: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if src_rate == dst_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = f64::from(src_rate) / f64::from(dst_rate);
    let out_len = (samples.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos as usize;
        let frac = pos - idx as f64;

        let value = if idx + 1 < samples.len() {
            f64::from(samples[idx]) * (1.0 - frac) + f64::from(samples[idx + 1]) * frac
        } else {
            f64::from(samples[idx.min(samples.len() - 1)])
        };
        output.push(value as f32);
    }

    output
}
