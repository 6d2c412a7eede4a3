//! End-to-end tests against a mock Gemini endpoint.

use base64::Engine;
use iris_core::output::{self, OutputFormat};
use iris_core::{AnalyzeError, AnalyzeOptions, Analyzer, ErrorKind, GeminiProvider, MediaType};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/models/gemini-2.5-pro:generateContent";

const JPEG_BYTES: [u8; 20] = [
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00, 0x01,
    0x00, 0x01, 0xFF, 0xD9,
];

fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("room.jpg");
    std::fs::write(&path, JPEG_BYTES).unwrap();
    path
}

fn analyzer_for(server: &MockServer, timeout: Duration) -> Analyzer {
    let provider = GeminiProvider::new(&server.uri(), "test-key", "gemini-2.5-pro", timeout);
    Analyzer::new(Box::new(provider), AnalyzeOptions::default())
}

fn text_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 260, "candidatesTokenCount": 12, "totalTokenCount": 272},
        "modelVersion": "gemini-2.5-pro"
    })
}

#[tokio::test]
async fn test_prints_text_from_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("A freshly made bed.")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = write_fixture(dir.path());
    let analysis = analyzer_for(&server, Duration::from_secs(5))
        .analyze(&image)
        .await
        .unwrap();

    assert_eq!(analysis.text, "A freshly made bed.");
    assert_eq!(analysis.model, "gemini-2.5-pro");
    assert_eq!(analysis.tokens_used, Some(272));
    assert_eq!(analysis.provider, "gemini");

    let mut stdout = Vec::new();
    output::write(&mut stdout, &analysis, OutputFormat::Text, false).unwrap();
    assert!(String::from_utf8(stdout)
        .unwrap()
        .contains("A freshly made bed."));
}

#[tokio::test]
async fn test_json_output_is_repeatable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_reply("T"))
                .set_delay(Duration::from_millis(50)),
        )
        .with_priority(1)
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("T")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = write_fixture(dir.path());
    let analyzer = analyzer_for(&server, Duration::from_secs(5));

    let mut printed = Vec::new();
    for _ in 0..2 {
        let analysis = analyzer.analyze(&image).await.unwrap();
        let mut stdout = Vec::new();
        output::write(&mut stdout, &analysis, OutputFormat::Json, false).unwrap();
        printed.push(String::from_utf8(stdout).unwrap());
    }

    assert_eq!(printed[0], printed[1]);
    assert!(printed[0].contains("\"text\":\"T\""));
    assert!(!printed[0].contains("latency_ms"));
}

#[tokio::test]
async fn test_transmitted_bytes_match_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("ok")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = write_fixture(dir.path());
    analyzer_for(&server, Duration::from_secs(5))
        .analyze(&image)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let parts = &body["contents"][0]["parts"];

    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
    let data = parts[0]["inlineData"]["data"].as_str().unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(data)
        .unwrap();
    assert_eq!(decoded, std::fs::read(&image).unwrap());

    assert_eq!(parts[1]["text"], "pls analyze this image.");
    assert!(body.get("generationConfig").is_none());
}

#[tokio::test]
async fn test_missing_file_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = analyzer_for(&server, Duration::from_secs(5))
        .analyze(&dir.path().join("2.png"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FileNotFound);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_reports_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "An internal error has occurred.", "status": "INTERNAL"}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = write_fixture(dir.path());
    let err = analyzer_for(&server, Duration::from_secs(5))
        .analyze(&image)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.status_code(), Some(500));
    assert!(err.to_string().contains("An internal error has occurred."));
}

#[tokio::test]
async fn test_rejected_key_reports_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "API_KEY_INVALID"}]
            }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = write_fixture(dir.path());
    let err = analyzer_for(&server, Duration::from_secs(5))
        .analyze(&image)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn test_rate_limit_reports_quota_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Resource has been exhausted (e.g. check quota).", "status": "RESOURCE_EXHAUSTED"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = write_fixture(dir.path());
    let err = analyzer_for(&server, Duration::from_secs(5))
        .analyze(&image)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Quota);
}

#[tokio::test]
async fn test_empty_candidates_reports_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = write_fixture(dir.path());
    let err = analyzer_for(&server, Duration::from_secs(5))
        .analyze(&image)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmptyResponse);
}

#[tokio::test]
async fn test_garbage_body_is_not_printed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = write_fixture(dir.path());
    let err = analyzer_for(&server, Duration::from_secs(5))
        .analyze(&image)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyzeError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_reply("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = write_fixture(dir.path());
    let err = analyzer_for(&server, Duration::from_millis(100))
        .analyze(&image)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyzeError::Timeout { .. }));
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_unreachable_endpoint_reports_network_error() {
    let provider = GeminiProvider::new(
        "http://127.0.0.1:9",
        "test-key",
        "gemini-2.5-pro",
        Duration::from_secs(5),
    );
    let analyzer = Analyzer::new(Box::new(provider), AnalyzeOptions::default());

    let dir = tempfile::tempdir().unwrap();
    let image = write_fixture(dir.path());
    let err = analyzer.analyze(&image).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_sampling_options_sent_as_generation_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("ok")))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(
        &server.uri(),
        "test-key",
        "gemini-2.5-pro",
        Duration::from_secs(5),
    );
    let options = AnalyzeOptions {
        prompt: "List any stains you can see.".to_string(),
        max_tokens: Some(200),
        temperature: Some(0.5),
        media_type: Some(MediaType::Jpeg),
        ..AnalyzeOptions::default()
    };
    let dir = tempfile::tempdir().unwrap();
    let image = write_fixture(dir.path());
    Analyzer::new(Box::new(provider), options)
        .analyze(&image)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 200);
    assert_eq!(body["generationConfig"]["temperature"], 0.5);
    assert_eq!(body["contents"][0]["parts"][1]["text"], "List any stains you can see.");
}
