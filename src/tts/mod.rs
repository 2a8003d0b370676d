//! Text-to-speech via a cloud synthesis endpoint.
//!
//! Sends text plus a language code and receives encoded MP3 bytes. The
//! adapter does not decode or play anything — that is the playback stage's
//! job — and it does not retry.

use crate::config::TtsConfig;
use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use tracing::debug;

/// Text-to-speech contract.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` to encoded audio bytes. Empty text yields an empty
    /// payload without a service call.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Cloud TTS client.
pub struct CloudSpeech {
    client: reqwest::Client,
    api_url: String,
    language: String,
}

impl CloudSpeech {
    /// Create a synthesis client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &TtsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AssistantError::Tts(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl Synthesizer for CloudSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", text),
                ("tl", self.language.as_str()),
                ("client", "tw-ob"),
            ])
            .send()
            .await
            .map_err(|e| AssistantError::Tts(format!("synthesis request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::Tts(format!(
                "synthesis rejected request: {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AssistantError::Tts(format!("failed to read synthesis response: {e}")))?;

        if bytes.is_empty() {
            return Err(AssistantError::Tts("synthesis returned no audio".into()));
        }

        debug!("synthesized {} bytes for {} chars", bytes.len(), text.len());
        Ok(bytes.to_vec())
    }
}
