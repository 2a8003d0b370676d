//! Cloud Recognizer Contract Tests
//!
//! Verify exact HTTP format compliance for the STT adapter: request query
//! parameters and body type, line-delimited response parsing, transcript
//! normalization, and error mapping.

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wren::AssistantError;
use wren::audio::AudioClip;
use wren::config::SttConfig;
use wren::stt::{CloudRecognizer, Transcriber};
use wren_lookup::ApiKeyRef;

const RATE: u32 = 16_000;

fn config_for(server: &MockServer) -> SttConfig {
    SttConfig {
        api_url: format!("{}/speech-api/v2/recognize", server.uri()),
        ..SttConfig::default()
    }
}

fn clip() -> AudioClip {
    AudioClip {
        samples: vec![0.1; RATE as usize],
        sample_rate: RATE,
    }
}

#[tokio::test]
async fn posts_wav_and_returns_normalized_transcript() {
    let server = MockServer::start().await;

    // Line-delimited response: an empty first line, then the hypothesis.
    let body = concat!(
        "{\"result\":[]}\n",
        "{\"result\":[{\"alternative\":[{\"transcript\":\"Wren play Bohemian Rhapsody\",",
        "\"confidence\":0.94}],\"final\":true}],\"result_index\":0}\n"
    );

    Mock::given(method("POST"))
        .and(path("/speech-api/v2/recognize"))
        .and(query_param("client", "wren"))
        .and(query_param("lang", "en-US"))
        .and(header("content-type", "audio/wav; rate=16000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let recognizer = CloudRecognizer::new(&config_for(&server), "wren").unwrap();
    let transcript = recognizer.transcribe(&clip()).await.unwrap();

    // Lowercased, wake word stripped, whitespace collapsed.
    assert_eq!(transcript.text, "play bohemian rhapsody");
}

#[tokio::test]
async fn api_key_is_sent_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/speech-api/v2/recognize"))
        .and(query_param("key", "stt-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "{\"result\":[{\"alternative\":[{\"transcript\":\"hello\"}]}]}\n",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = SttConfig {
        api_key: ApiKeyRef::Literal {
            value: "stt-key".to_owned(),
        },
        ..config_for(&server)
    };
    let recognizer = CloudRecognizer::new(&config, "wren").unwrap();
    let transcript = recognizer.transcribe(&clip()).await.unwrap();
    assert_eq!(transcript.text, "hello");
}

#[tokio::test]
async fn empty_result_set_is_unintelligible() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/speech-api/v2/recognize"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"result\":[]}\n"))
        .mount(&server)
        .await;

    let recognizer = CloudRecognizer::new(&config_for(&server), "wren").unwrap();
    let result = recognizer.transcribe(&clip()).await;
    assert!(matches!(result, Err(AssistantError::Unintelligible(_))));
}

#[tokio::test]
async fn server_error_is_service_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/speech-api/v2/recognize"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let recognizer = CloudRecognizer::new(&config_for(&server), "wren").unwrap();
    let result = recognizer.transcribe(&clip()).await;
    assert!(matches!(result, Err(AssistantError::Stt(_))));
}

#[tokio::test]
async fn unreachable_endpoint_is_service_failure() {
    let config = SttConfig {
        // Nothing listens here.
        api_url: "http://127.0.0.1:9/speech-api/v2/recognize".to_owned(),
        ..SttConfig::default()
    };
    let recognizer = CloudRecognizer::new(&config, "wren").unwrap();
    let result = recognizer.transcribe(&clip()).await;
    assert!(matches!(result, Err(AssistantError::Stt(_))));
}
