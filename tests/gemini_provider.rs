#![allow(clippy::unwrap_used)]
//! Gemini provider tests against a local mock server.

use chat_translator::translation::{
    Connector, GeminiConnector, RequestError, RetryPolicy, RetryingRequestRunner,
    TranslationClient, TranslationRequest, TranslationResult,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";
const ENDPOINT_PATH: &str = "/models/gemini-test:generateContent";

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn client_for(server: &MockServer) -> TranslationClient {
    let connector = GeminiConnector::new(server.uri());
    TranslationClient::configure(&connector, "test-key", MODEL).unwrap()
}

#[tokio::test]
async fn test_request_shape_and_translation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Bonjour le monde" }] }],
            "generationConfig": { "temperature": 0.4 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Hello world [fr]")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let raw = client
        .translate(&TranslationRequest::new("Bonjour le monde", MODEL))
        .await
        .unwrap();

    assert_eq!(raw.as_deref(), Some("Hello world [fr]"));
}

#[tokio::test]
async fn test_system_instruction_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("INPUT_SKIP")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .translate(&TranslationRequest::new("Hello there", MODEL))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let instruction = body["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
    assert!(instruction.contains("INPUT_SKIP"));
}

#[tokio::test]
async fn test_missing_candidates_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let raw = client_for(&server)
        .translate(&TranslationRequest::new("Hola", MODEL))
        .await
        .unwrap();

    assert!(raw.is_none());
}

#[tokio::test]
async fn test_http_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .translate(&TranslationRequest::new("Hola", MODEL))
        .await
        .unwrap_err();

    match err {
        RequestError::Api { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("API key not valid"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_body_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .translate(&TranslationRequest::new("Hola", MODEL))
        .await
        .unwrap_err();

    assert!(matches!(err, RequestError::Decode(_)));
}

#[tokio::test]
async fn test_runner_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let runner = RetryingRequestRunner::new(RetryPolicy::new(3, Duration::from_millis(10)));
    let result = runner
        .run(&client_for(&server), TranslationRequest::new("Hola", MODEL))
        .await;

    assert!(matches!(
        result,
        TranslationResult::Failed(RequestError::Api { status: 503, .. })
    ));
}

#[test]
fn test_connector_rejects_bad_credentials() {
    let connector = GeminiConnector::default();
    assert!(connector.connect("has space", MODEL).is_err());
    assert!(connector.connect("key", "bad model/name").is_err());
    assert!(connector.connect("key", "models/gemini-2.0-flash").is_ok());
}
