//! End-to-end dispatch cycle tests with in-process adapters.
//!
//! Drives the coordinator through complete cycles — synthetic audio frames
//! in, session record out — covering ordering, termination, one-shot audio
//! delivery, and degraded adapter behavior.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use wren::audio::{AudioClip, AudioFrame};
use wren::config::AssistantConfig;
use wren::intent::{GOODBYE_REPLY, IntentDispatcher};
use wren::lookup::{Encyclopedia, WeatherProvider};
use wren::pipeline::coordinator::{NO_SPEECH_REPLY, STT_FAILURE_REPLY, UNINTELLIGIBLE_REPLY};
use wren::stt::{Transcriber, Transcript};
use wren::tts::Synthesizer;
use wren::{Assistant, AssistantError, CycleOutcome};
use wren_lookup::{LookupError, Summary, WeatherReport};

const RATE: u32 = 16_000;

/// Transcriber that replays a scripted sequence of results.
struct ScriptedTranscriber {
    script: Mutex<VecDeque<wren::Result<Transcript>>>,
}

impl ScriptedTranscriber {
    fn new(results: Vec<wren::Result<Transcript>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(results.into()),
        })
    }

    fn saying(lines: &[&str]) -> Arc<Self> {
        Self::new(
            lines
                .iter()
                .map(|line| {
                    Ok(Transcript {
                        text: (*line).to_owned(),
                    })
                })
                .collect(),
        )
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, _clip: &AudioClip) -> wren::Result<Transcript> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AssistantError::Stt("script exhausted".into())))
    }
}

/// Synthesizer returning a fixed payload, optionally failing.
struct FixedSynthesizer {
    fail: bool,
    calls: AtomicUsize,
}

impl FixedSynthesizer {
    fn working() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn broken() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Synthesizer for FixedSynthesizer {
    async fn synthesize(&self, text: &str) -> wren::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AssistantError::Tts("synthesis down".into()));
        }
        Ok(format!("mp3:{text}").into_bytes())
    }
}

struct StubEncyclopedia;

#[async_trait]
impl Encyclopedia for StubEncyclopedia {
    async fn summary(&self, query: &str, _sentences: usize) -> wren_lookup::Result<Summary> {
        Ok(Summary {
            title: query.to_owned(),
            extract: format!("{query} is a test subject."),
        })
    }
}

struct StubWeather;

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn current(&self, _city: &str) -> wren_lookup::Result<WeatherReport> {
        Err(LookupError::NotFound("city not found".into()))
    }
}

fn dispatcher() -> IntentDispatcher {
    IntentDispatcher::new(Arc::new(StubEncyclopedia), Arc::new(StubWeather), 1)
}

fn assistant_with(
    transcriber: Arc<ScriptedTranscriber>,
    synthesizer: Arc<FixedSynthesizer>,
) -> Assistant {
    let config = AssistantConfig::default();
    Assistant::with_adapters(&config, transcriber, synthesizer, dispatcher())
}

/// A phrase's worth of frames: speech followed by closing silence.
async fn send_phrase(tx: &mpsc::Sender<AudioFrame>) {
    let speech = AudioFrame {
        samples: vec![0.3; (RATE / 2) as usize],
        sample_rate: RATE,
    };
    let silence = AudioFrame {
        samples: vec![0.0; (RATE * 2) as usize],
        sample_rate: RATE,
    };
    tx.send(speech).await.unwrap();
    tx.send(silence).await.unwrap();
}

fn clip_of_speech() -> AudioClip {
    AudioClip {
        samples: vec![0.2; RATE as usize],
        sample_rate: RATE,
    }
}

#[tokio::test]
async fn full_cycle_updates_session_and_stores_audio() {
    let mut assistant = assistant_with(
        ScriptedTranscriber::saying(&["who is ada lovelace"]),
        FixedSynthesizer::working(),
    );
    let (tx, mut rx) = mpsc::channel(8);
    send_phrase(&tx).await;

    let outcome = assistant.run_cycle(&mut rx).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Completed);

    let session = assistant.session();
    assert_eq!(session.last_command, "who is ada lovelace");
    assert_eq!(
        session.response_display,
        "ada lovelace is a test subject."
    );
    assert!(session.has_pending_audio());
}

#[tokio::test]
async fn pending_audio_is_one_shot() {
    let mut assistant = assistant_with(
        ScriptedTranscriber::saying(&["tell me a joke"]),
        FixedSynthesizer::working(),
    );
    let (tx, mut rx) = mpsc::channel(8);
    send_phrase(&tx).await;

    assistant.run_cycle(&mut rx).await.unwrap();
    assert!(assistant.session_mut().take_pending_audio().is_some());
    assert!(assistant.session_mut().take_pending_audio().is_none());
}

#[tokio::test]
async fn responses_arrive_in_command_order() {
    let mut assistant = assistant_with(
        ScriptedTranscriber::saying(&["play abba", "tell me a joke"]),
        FixedSynthesizer::working(),
    );
    let (tx, mut rx) = mpsc::channel(8);

    send_phrase(&tx).await;
    assistant.run_cycle(&mut rx).await.unwrap();
    assert_eq!(assistant.session().last_command, "play abba");
    assert!(assistant.session().response_display.contains("abba"));

    send_phrase(&tx).await;
    assistant.run_cycle(&mut rx).await.unwrap();
    assert_eq!(assistant.session().last_command, "tell me a joke");
    assert!(!assistant.session().response_display.contains("abba"));
}

#[tokio::test]
async fn stop_terminates_and_halts_further_processing() {
    let mut assistant = assistant_with(
        ScriptedTranscriber::saying(&["stop", "tell me a joke"]),
        FixedSynthesizer::working(),
    );
    let (tx, mut rx) = mpsc::channel(8);
    send_phrase(&tx).await;

    let outcome = assistant.run_cycle(&mut rx).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Terminated);
    assert_eq!(assistant.session().response_speech, GOODBYE_REPLY);

    // A further cycle never touches the frame channel or the transcriber.
    let outcome = assistant.run_cycle(&mut rx).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Terminated);
    assert_eq!(assistant.session().response_speech, GOODBYE_REPLY);
}

#[tokio::test]
async fn capture_timeout_degrades_to_reply_without_stt() {
    let transcriber = ScriptedTranscriber::new(Vec::new());
    let mut assistant = assistant_with(Arc::clone(&transcriber), FixedSynthesizer::working());
    let (tx, mut rx) = mpsc::channel(64);

    // Silence only, longer than the 5s default start timeout.
    for _ in 0..6 {
        tx.send(AudioFrame {
            samples: vec![0.0; RATE as usize],
            sample_rate: RATE,
        })
        .await
        .unwrap();
    }
    drop(tx);

    let outcome = assistant.run_cycle(&mut rx).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Completed);
    assert_eq!(assistant.session().response_speech, NO_SPEECH_REPLY);
    // The script is untouched: no transcription was attempted.
    assert_eq!(transcriber.script.lock().unwrap().len(), 0);
}

#[tokio::test]
async fn unintelligible_audio_gets_its_own_reply() {
    let mut assistant = assistant_with(
        ScriptedTranscriber::new(vec![Err(AssistantError::Unintelligible(
            "no hypothesis".into(),
        ))]),
        FixedSynthesizer::working(),
    );
    let (tx, mut rx) = mpsc::channel(8);
    send_phrase(&tx).await;

    assistant.run_cycle(&mut rx).await.unwrap();
    assert_eq!(assistant.session().response_speech, UNINTELLIGIBLE_REPLY);
    assert!(assistant.session().last_command.is_empty());
}

#[tokio::test]
async fn recognizer_failure_gets_generic_reply() {
    let mut assistant = assistant_with(
        ScriptedTranscriber::new(vec![Err(AssistantError::Stt("boom".into()))]),
        FixedSynthesizer::working(),
    );
    let (tx, mut rx) = mpsc::channel(8);
    send_phrase(&tx).await;

    assistant.run_cycle(&mut rx).await.unwrap();
    assert_eq!(assistant.session().response_speech, STT_FAILURE_REPLY);
}

#[tokio::test]
async fn synthesis_failure_leaves_text_only_response() {
    let mut assistant = assistant_with(
        ScriptedTranscriber::saying(&["what time is it"]),
        FixedSynthesizer::broken(),
    );
    let (tx, mut rx) = mpsc::channel(8);
    send_phrase(&tx).await;

    let outcome = assistant.run_cycle(&mut rx).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Completed);
    assert!(assistant.session().response_speech.contains("current time"));
    assert!(!assistant.session().has_pending_audio());
}

#[tokio::test]
async fn greeting_is_spoken_once() {
    let synthesizer = FixedSynthesizer::working();
    let mut assistant = assistant_with(
        ScriptedTranscriber::new(Vec::new()),
        Arc::clone(&synthesizer),
    );

    assistant.greet().await;
    assert!(assistant.session().greeted);
    assert!(assistant.session().has_pending_audio());
    assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 1);

    assistant.greet().await;
    assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn streaming_recording_runs_the_same_cycle() {
    let mut assistant = assistant_with(
        ScriptedTranscriber::saying(&["weather in atlantis"]),
        FixedSynthesizer::working(),
    );

    let outcome = assistant.process_recording(clip_of_speech()).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Completed);
    assert!(assistant
        .session()
        .response_speech
        .starts_with("Sorry, I couldn't find the weather for atlantis."));
}

#[tokio::test]
async fn begin_cycle_clears_previous_display_before_capture() {
    let mut assistant = assistant_with(
        ScriptedTranscriber::saying(&["tell me a joke"]),
        FixedSynthesizer::working(),
    );
    let (tx, mut rx) = mpsc::channel(64);
    send_phrase(&tx).await;
    assistant.run_cycle(&mut rx).await.unwrap();
    assert!(!assistant.session().response_display.is_empty());

    // Next cycle times out; the stale response must not survive it.
    for _ in 0..6 {
        tx.send(AudioFrame {
            samples: vec![0.0; RATE as usize],
            sample_rate: RATE,
        })
        .await
        .unwrap();
    }
    drop(tx);
    assistant.run_cycle(&mut rx).await.unwrap();
    assert_eq!(assistant.session().response_speech, NO_SPEECH_REPLY);
    assert!(assistant.session().last_command.is_empty());
}
