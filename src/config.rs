//! Configuration types for the assistant.

use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wren_lookup::{ApiKeyRef, LookupConfig};

/// Top-level configuration for the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Audio device settings.
    pub audio: AudioConfig,
    /// Phrase capture settings (timeouts, energy threshold).
    pub capture: CaptureConfig,
    /// Speech-to-text service settings.
    pub stt: SttConfig,
    /// Text-to-speech service settings.
    pub tts: TtsConfig,
    /// Conversation settings (wake word, greeting).
    pub conversation: ConversationConfig,
    /// Knowledge lookup settings (encyclopedia, weather).
    pub lookup: LookupConfig,
}

impl AssistantConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::Config(format!("failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|e| {
            AssistantError::Config(format!("invalid config {}: {e}", path.display()))
        })
    }
}

/// Audio I/O configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate captured audio is downsampled to, in Hz.
    pub input_sample_rate: u32,
    /// Input device name (None = system default).
    pub input_device: Option<String>,
    /// Output device name (None = system default).
    pub output_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_sample_rate: 16_000,
            input_device: None,
            output_device: None,
        }
    }
}

/// Phrase capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// How long to wait for speech to begin before giving up, in ms.
    pub start_timeout_ms: u32,
    /// Maximum phrase length once speech has started, in ms.
    pub max_phrase_ms: u32,
    /// Trailing silence that ends a phrase, in ms.
    pub min_silence_ms: u32,
    /// RMS energy threshold for speech detection.
    ///
    /// Frames with RMS above this value count as speech. Typical values for
    /// f32 samples in \[-1, 1\]:
    ///   - 0.005: very sensitive (picks up quiet speech and some noise)
    ///   - 0.01:  normal sensitivity (default)
    ///   - 0.02:  reduced sensitivity (noisy environments)
    pub energy_threshold: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            start_timeout_ms: 5_000,
            max_phrase_ms: 10_000,
            min_silence_ms: 1_200,
            energy_threshold: 0.01,
        }
    }
}

/// Speech-to-text service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Recognizer endpoint URL.
    pub api_url: String,
    /// BCP-47 language tag sent with each request.
    pub language: String,
    /// Optional API key for the recognizer.
    pub api_key: ApiKeyRef,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.google.com/speech-api/v2/recognize".to_owned(),
            language: "en-US".to_owned(),
            api_key: ApiKeyRef::None,
        }
    }
}

/// Text-to-speech service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Synthesis endpoint URL. Returns MP3 audio for a text + language pair.
    pub api_url: String,
    /// Language code sent with each request.
    pub language: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://translate.google.com/translate_tts".to_owned(),
            language: "en".to_owned(),
        }
    }
}

/// Conversation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Wake word stripped from transcripts after recognition.
    pub wake_word: String,
    /// Greeting spoken on the first interaction of a session.
    pub greeting: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            wake_word: "wren".to_owned(),
            greeting: "Hello! How can I help you?".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn default_config_roundtrips_through_toml() {
        let config = AssistantConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back: AssistantConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.audio.input_sample_rate, 16_000);
        assert_eq!(back.conversation.wake_word, "wren");
        assert_eq!(back.lookup.summary_sentences, 1);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AssistantConfig = toml::from_str(
            r#"
[capture]
start_timeout_ms = 3000

[conversation]
wake_word = "holly"
"#,
        )
        .unwrap();
        assert_eq!(config.capture.start_timeout_ms, 3_000);
        assert_eq!(config.capture.max_phrase_ms, 10_000);
        assert_eq!(config.conversation.wake_word, "holly");
        assert_eq!(config.stt.language, "en-US");
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[tts]
language = "en-GB"

[lookup.weather.api_key]
type = "env"
var = "OPENWEATHER_API_KEY"
"#,
        )
        .unwrap();

        let config = AssistantConfig::from_file(&path).unwrap();
        assert_eq!(config.tts.language, "en-GB");
        assert!(config.lookup.weather.api_key.is_configured());
    }

    #[test]
    fn from_file_missing_is_config_error() {
        let result = AssistantConfig::from_file(Path::new("/nonexistent/wren.toml"));
        assert!(matches!(result, Err(AssistantError::Config(_))));
    }
}
