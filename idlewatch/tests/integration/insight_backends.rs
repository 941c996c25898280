//! Gemini and Ollama request/response handling against mock servers

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use idlewatch::insight::{
    analyze_or_fallback, AIAnalysis, AgentSummary, GeminiBackend, InsightBackend, InsightError,
    OllamaBackend,
};

fn summaries() -> Vec<AgentSummary> {
    vec![AgentSummary {
        name: "Alice".to_string(),
        queue: "Support".to_string(),
        idle_time: 22,
        status: "IDLE".to_string(),
        score: 40,
    }]
}

fn analysis_json() -> String {
    json!({
        "summary": "One agent idle for 22 minutes.",
        "recommendations": ["Check in with Alice"],
        "bottlenecks": ["Support queue starved"]
    })
    .to_string()
}

#[tokio::test]
async fn test_ollama_chat_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.1:8b",
            "stream": false,
            "format": { "type": "object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.1:8b",
            "message": { "role": "assistant", "content": analysis_json() },
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(reqwest::Client::new(), &server.uri(), "llama3.1:8b");
    let analysis = backend.analyze(&summaries()).await.unwrap();

    assert_eq!(analysis.summary, "One agent idle for 22 minutes.");
    assert_eq!(analysis.recommendations, vec!["Check in with Alice"]);
}

#[tokio::test]
async fn test_ollama_empty_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": { "role": "assistant", "content": "  " }
        })))
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(reqwest::Client::new(), &server.uri(), "llama3.1:8b");
    let err = backend.analyze(&summaries()).await.unwrap_err();
    assert!(matches!(err, InsightError::EmptyResponse("ollama")));
}

#[tokio::test]
async fn test_gemini_generate_content_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": analysis_json() }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = GeminiBackend::new(reqwest::Client::new(), &server.uri(), "gemini-test", "test-key");
    let analysis = backend.analyze(&summaries()).await.unwrap();
    assert_eq!(analysis.bottlenecks, vec!["Support queue starved"]);

    // The prompt embeds the roster as JSON
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains(r#""idleTime":22"#));
}

#[tokio::test]
async fn test_gemini_without_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = GeminiBackend::new(reqwest::Client::new(), &server.uri(), "gemini-test", "");
    let err = backend.analyze(&summaries()).await.unwrap_err();
    assert!(matches!(err, InsightError::Config(_)));
}

#[tokio::test]
async fn test_server_error_degrades_to_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(500).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let backend = GeminiBackend::new(reqwest::Client::new(), &server.uri(), "gemini-test", "test-key");
    let err = backend.analyze(&summaries()).await.unwrap_err();
    assert!(matches!(err, InsightError::Status { status: 500, .. }));

    let agents = vec![];
    let analysis = analyze_or_fallback(&backend, &agents).await;
    assert_eq!(analysis, AIAnalysis::fallback());
}

#[tokio::test]
async fn test_malformed_model_output_degrades_to_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": { "role": "assistant", "content": "Sure! Here is my analysis..." }
        })))
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(reqwest::Client::new(), &server.uri(), "llama3.1:8b");
    assert!(matches!(
        backend.analyze(&summaries()).await,
        Err(InsightError::Parse(_))
    ));
    assert_eq!(
        analyze_or_fallback(&backend, &[]).await,
        AIAnalysis::fallback()
    );
}
