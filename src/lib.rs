//! Wren: a keyword-driven voice assistant.
//!
//! This crate provides a blocking command/response pipeline:
//! Microphone → phrase capture → STT → intent dispatch → TTS → Speaker
//!
//! # Architecture
//!
//! - **Audio capture**: records from the microphone via `cpal`, with a
//!   timed mode (speech-start timeout + max phrase length) and a streaming
//!   push-to-talk mode (explicit start/stop around a guarded buffer)
//! - **STT**: posts captured WAV audio to a cloud recognizer
//! - **Intent dispatch**: an ordered keyword rule table with naive
//!   parameter extraction; lookups delegate to the `wren-lookup` crate
//! - **TTS**: fetches MP3 speech for each reply from a cloud synthesizer
//! - **Audio playback**: decodes and plays replies via `symphonia` + `cpal`
//!
//! Session state (last command, last response, one-shot audio payload) is
//! an explicit per-session record owned by the [`Assistant`] coordinator.

pub mod audio;
pub mod config;
pub mod error;
pub mod intent;
pub mod jokes;
pub mod lookup;
pub mod pipeline;
pub mod session;
pub mod stt;
pub mod tts;

pub use config::AssistantConfig;
pub use error::{AssistantError, Result};
pub use intent::{DispatchOutcome, Intent, IntentDispatcher, Response};
pub use pipeline::{Assistant, CycleOutcome};
pub use session::SessionState;
