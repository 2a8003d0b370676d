//! Error types for the assistant pipeline.

/// Top-level error type for the voice assistant.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Audio device or stream error.
    #[error("audio error: {0}")]
    Audio(String),

    /// No speech was detected before the capture timeout elapsed.
    #[error("capture timeout: {0}")]
    CaptureTimeout(String),

    /// Speech was present but the recognizer produced no hypothesis.
    #[error("unintelligible audio: {0}")]
    Unintelligible(String),

    /// Speech-to-text request error.
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech request error.
    #[error("TTS error: {0}")]
    Tts(String),

    /// Knowledge lookup error (encyclopedia, weather).
    #[error("lookup error: {0}")]
    Lookup(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AssistantError>;
