//! Terminal front end for the Wren voice assistant.
//!
//! Two conversation modes plus a device listing:
//! - `wren` — hands-free: each cycle waits for a phrase, then answers.
//! - `wren talk` — push-to-talk: press Enter to start and stop recording.
//! - `wren devices` — list audio devices.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wren::audio::mic::MicSource;
use wren::audio::playback::SpeakerOutput;
use wren::audio::recorder::StreamingRecorder;
use wren::audio::AudioFrame;
use wren::{Assistant, AssistantConfig, CycleOutcome};

/// Frames buffered between the microphone task and phrase capture.
const FRAME_CHANNEL_SIZE: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Suppress noisy dependency logs by default; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wren=info")),
        )
        .init();

    let config = load_config()?;

    match std::env::args().nth(1).as_deref() {
        None | Some("chat") => run_chat(config).await,
        Some("talk") => run_talk(config).await,
        Some("devices") => list_devices(),
        Some(other) => {
            eprintln!("unknown command '{other}'. Commands: chat (default), talk, devices");
            std::process::exit(2);
        }
    }
}

/// Load config from `WREN_CONFIG`, the platform config dir, or defaults.
fn load_config() -> anyhow::Result<AssistantConfig> {
    if let Ok(path) = std::env::var("WREN_CONFIG") {
        return Ok(AssistantConfig::from_file(&PathBuf::from(path))?);
    }

    let default_path = dirs::config_dir().map(|dir| dir.join("wren/config.toml"));
    if let Some(path) = default_path.filter(|p| p.exists()) {
        info!("loading config from {}", path.display());
        return Ok(AssistantConfig::from_file(&path)?);
    }

    Ok(AssistantConfig::default())
}

/// Spawn the microphone stage, feeding frames into `tx` until cancelled.
fn spawn_mic_stage(
    config: &AssistantConfig,
    tx: mpsc::Sender<AudioFrame>,
    cancel: CancellationToken,
) {
    let audio_config = config.audio.clone();
    tokio::spawn(async move {
        match MicSource::open(&audio_config) {
            Ok(mic) => {
                if let Err(e) = mic.run(tx, cancel).await {
                    error!("microphone stage error: {e}");
                }
            }
            Err(e) => error!("failed to open microphone: {e}"),
        }
    });
}

/// Hands-free conversation loop.
async fn run_chat(config: AssistantConfig) -> anyhow::Result<()> {
    println!("Wren v{}", env!("CARGO_PKG_VERSION"));

    let mut assistant = Assistant::from_config(&config)?;
    let speaker = SpeakerOutput::open(&config.audio)?;

    let (frame_tx, mut frame_rx) = mpsc::channel(FRAME_CHANNEL_SIZE);
    let cancel = CancellationToken::new();
    spawn_mic_stage(&config, frame_tx, cancel.clone());

    let cancel_on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel_on_interrupt.cancel();
        }
    });

    println!("\nReady! Speak a command, or say \"stop\" to end the session.\n");

    assistant.greet().await;
    render(&mut assistant, &speaker);

    loop {
        if cancel.is_cancelled() {
            break;
        }
        let outcome = assistant.run_cycle(&mut frame_rx).await?;
        render(&mut assistant, &speaker);
        if outcome == CycleOutcome::Terminated {
            break;
        }
    }

    cancel.cancel();
    Ok(())
}

/// Push-to-talk loop: Enter starts a recording, Enter again dispatches it.
async fn run_talk(config: AssistantConfig) -> anyhow::Result<()> {
    println!("Wren v{} - Push-to-talk Mode", env!("CARGO_PKG_VERSION"));

    let mut assistant = Assistant::from_config(&config)?;
    let speaker = SpeakerOutput::open(&config.audio)?;
    let recorder = Arc::new(StreamingRecorder::new());

    let (frame_tx, mut frame_rx) = mpsc::channel::<AudioFrame>(FRAME_CHANNEL_SIZE);
    let cancel = CancellationToken::new();
    spawn_mic_stage(&config, frame_tx, cancel.clone());

    // Forward mic frames into the recorder; it discards them while idle.
    let sink = Arc::clone(&recorder);
    tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            sink.push(&frame.samples);
        }
    });

    println!("\nPress Enter to start recording, Enter again to send. Say \"stop\" to end.\n");

    let stdin = std::io::stdin();
    let sample_rate = config.audio.input_sample_rate;

    assistant.greet().await;
    render(&mut assistant, &speaker);

    loop {
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        if recorder.is_recording() {
            let Some(clip) = recorder.stop() else {
                continue;
            };
            let outcome = assistant.process_recording(clip).await?;
            render(&mut assistant, &speaker);
            if outcome == CycleOutcome::Terminated {
                break;
            }
            println!("Press Enter to record the next command.");
        } else {
            assistant.session_mut().begin_cycle();
            recorder.start(sample_rate);
            println!("Recording... press Enter to send.");
        }
    }

    cancel.cancel();
    Ok(())
}

/// Render the last command and response, then play the one-shot audio.
fn render(assistant: &mut Assistant, speaker: &SpeakerOutput) {
    let session = assistant.session();
    if !session.last_command.is_empty() {
        println!("You:  {}", session.last_command);
    }
    if !session.response_display.is_empty() {
        println!("Wren: {}\n", session.response_display);
    }

    // Read-then-clear: the payload plays exactly once.
    if let Some(audio) = assistant.session_mut().take_pending_audio() {
        if let Err(e) = speaker.play_mp3(&audio) {
            error!("playback failed: {e}");
        }
    }
}

fn list_devices() -> anyhow::Result<()> {
    println!("Input devices:");
    for name in MicSource::list_input_devices()? {
        println!("  - {name}");
    }

    println!("\nOutput devices:");
    for name in SpeakerOutput::list_output_devices()? {
        println!("  - {name}");
    }

    Ok(())
}
