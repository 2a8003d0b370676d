//! Speech-to-text via a cloud recognizer.
//!
//! Captured PCM is encoded as 16-bit WAV and posted to the recognizer
//! endpoint; the response is one JSON object per line, of which the first
//! with a non-empty result list carries the hypothesis. An empty result set
//! means the service heard audio but produced no hypothesis — reported as
//! [`AssistantError::Unintelligible`], distinct from transport failures.

use crate::audio::{AudioClip, encode_wav};
use crate::config::SttConfig;
use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use wren_lookup::ApiKeyRef;

/// A normalized transcription: lowercased, trimmed, wake word stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// The normalized text.
    pub text: String,
}

/// Speech-to-text contract.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a captured clip.
    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcript>;
}

/// Cloud speech recognizer client.
pub struct CloudRecognizer {
    client: reqwest::Client,
    api_url: String,
    language: String,
    api_key: Option<String>,
    wake_word: String,
}

/// One line of the recognizer response.
#[derive(Debug, Deserialize)]
struct RecognizerLine {
    #[serde(default)]
    result: Vec<RecognizerResult>,
}

#[derive(Debug, Deserialize)]
struct RecognizerResult {
    #[serde(default)]
    alternative: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    transcript: Option<String>,
}

impl CloudRecognizer {
    /// Create a recognizer client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or a configured
    /// API key fails to resolve.
    pub fn new(config: &SttConfig, wake_word: &str) -> Result<Self> {
        let api_key = match &config.api_key {
            ApiKeyRef::None => None,
            key => Some(
                key.resolve()
                    .map_err(|e| AssistantError::Config(format!("STT API key: {e}")))?,
            ),
        };

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AssistantError::Stt(format!("failed to build HTTP client: {e}")))?;

        info!("recognizer configured for language {}", config.language);
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            language: config.language.clone(),
            api_key,
            wake_word: wake_word.to_lowercase(),
        })
    }
}

#[async_trait]
impl Transcriber for CloudRecognizer {
    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcript> {
        let wav = encode_wav(&clip.samples, clip.sample_rate)?;
        debug!(
            "transcribing {:.1}s clip ({} bytes)",
            clip.duration_secs(),
            wav.len()
        );

        let mut request = self
            .client
            .post(&self.api_url)
            .query(&[("client", "wren"), ("lang", self.language.as_str())])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("audio/wav; rate={}", clip.sample_rate),
            )
            .body(wav);
        if let Some(ref key) = self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AssistantError::Stt(format!("recognizer request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::Stt(format!(
                "recognizer rejected request: {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::Stt(format!("failed to read recognizer response: {e}")))?;

        let raw = best_hypothesis(&body)?;
        let text = normalize_transcript(&raw, &self.wake_word);
        info!("transcribed: \"{text}\"");
        Ok(Transcript { text })
    }
}

/// Pick the first hypothesis out of the line-delimited response body.
///
/// # Errors
///
/// Returns [`AssistantError::Unintelligible`] when every line has an empty
/// result list, and [`AssistantError::Stt`] when no line parses at all.
fn best_hypothesis(body: &str) -> Result<String> {
    let mut parsed_any = false;
    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        let Ok(parsed) = serde_json::from_str::<RecognizerLine>(line) else {
            continue;
        };
        parsed_any = true;
        if let Some(text) = parsed
            .result
            .first()
            .and_then(|r| r.alternative.first())
            .and_then(|a| a.transcript.clone())
        {
            return Ok(text);
        }
    }

    if parsed_any {
        Err(AssistantError::Unintelligible(
            "recognizer returned no hypothesis".into(),
        ))
    } else {
        Err(AssistantError::Stt(
            "recognizer response had no parseable lines".into(),
        ))
    }
}

/// Normalize a raw hypothesis: lowercase, strip the wake word, collapse the
/// leftover whitespace, trim.
#[must_use]
pub fn normalize_transcript(raw: &str, wake_word: &str) -> String {
    let mut text = raw.to_lowercase();
    if !wake_word.is_empty() && text.contains(wake_word) {
        text = text.replace(wake_word, " ");
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_transcript("  Play Abba  ", "wren"), "play abba");
    }

    #[test]
    fn normalize_strips_leading_wake_word() {
        assert_eq!(
            normalize_transcript("Wren, what time is it", "wren"),
            ", what time is it"
        );
    }

    #[test]
    fn normalize_strips_wake_word_anywhere() {
        assert_eq!(
            normalize_transcript("hey wren tell me a joke", "wren"),
            "hey tell me a joke"
        );
    }

    #[test]
    fn normalize_without_wake_word_is_passthrough() {
        assert_eq!(normalize_transcript("Stop", ""), "stop");
    }

    #[test]
    fn hypothesis_skips_empty_first_line() {
        let body = "{\"result\":[]}\n{\"result\":[{\"alternative\":[{\"transcript\":\"hello there\",\"confidence\":0.92}],\"final\":true}],\"result_index\":0}\n";
        assert_eq!(best_hypothesis(body).unwrap(), "hello there");
    }

    #[test]
    fn all_empty_results_are_unintelligible() {
        let body = "{\"result\":[]}\n{\"result\":[]}\n";
        assert!(matches!(
            best_hypothesis(body),
            Err(AssistantError::Unintelligible(_))
        ));
    }

    #[test]
    fn unparseable_body_is_service_error() {
        assert!(matches!(
            best_hypothesis("<!DOCTYPE html>"),
            Err(AssistantError::Stt(_))
        ));
    }
}
