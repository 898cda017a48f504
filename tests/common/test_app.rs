//! Test application setup utilities
//!
//! Provides utilities for setting up test instances of the application
//! with either the extractive engines or a mock language model.

use std::sync::Arc;

use axum::{body::Body, http::Request, Router};
use tower::ServiceExt;

use research_assistant::{
    api,
    config::{AppConfig, LoggingConfig, QaConfig, RateLimitSettings, ServerConfig},
    services::{LanguageModel, ResearchAssistant},
    AppState,
};

use super::mocks::MockLanguageModel;

/// Multipart boundary used by [`TestApp::post_file`]
const BOUNDARY: &str = "research-assistant-test-boundary";

/// Test application wrapper for integration testing
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a test application running the extractive engines
    pub async fn new() -> Self {
        Self::with_config(test_config(), None).await
    }

    /// Create a test application backed by a mock language model
    pub async fn with_model(model: Arc<MockLanguageModel>) -> Self {
        let llm: Arc<dyn LanguageModel> = model;
        Self::with_config(test_config(), Some(llm)).await
    }

    /// Create a test application with custom configuration
    pub async fn with_config(config: AppConfig, llm: Option<Arc<dyn LanguageModel>>) -> Self {
        let assistant = ResearchAssistant::new(llm, &config);
        let state = AppState::new(config, assistant);

        let router = Router::new()
            .nest("/api/v1", api::routes())
            .with_state(state.clone());

        Self { router, state }
    }

    /// Make a GET request to the test application
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Upload a file as the `file` field of a multipart form
    pub async fn post_file(&self, uri: &str, file_name: &str, content: &[u8]) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make an arbitrary request
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Create a document from text and return its id
    pub async fn create_document(&self, name: &str, text: &str) -> String {
        let response = self
            .post_json(
                "/api/v1/documents/text",
                serde_json::json!({ "name": name, "text": text }),
            )
            .await;
        response.assert_created();

        let json: serde_json::Value = response.json();
        json["id"]
            .as_str()
            .expect("Document response has no id")
            .to_string()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: axum::http::StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: bytes::Bytes,
}

impl TestResponse {
    /// Get the response body as a string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Parse the response body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse response as JSON")
    }

    /// Assert the response status
    pub fn assert_status(&self, expected: axum::http::StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Assert the response status is OK (200)
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::OK)
    }

    /// Assert the response status is Created (201)
    pub fn assert_created(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::CREATED)
    }

    /// Assert the response status is No Content (204)
    pub fn assert_no_content(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::NO_CONTENT)
    }

    /// Assert the response status is Bad Request (400)
    pub fn assert_bad_request(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::BAD_REQUEST)
    }

    /// Assert the response status is Not Found (404)
    pub fn assert_not_found(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::NOT_FOUND)
    }

    /// Error message of a JSON error body
    pub fn error_message(&self) -> String {
        let json: serde_json::Value = self.json();
        json["message"].as_str().unwrap_or_default().to_string()
    }

    /// Parse a `text/event-stream` body into `(event, data)` pairs
    pub fn sse_events(&self) -> Vec<(String, String)> {
        let text = self.text();
        text.split("\n\n")
            .filter_map(|block| {
                let mut event = None;
                let mut data = Vec::new();
                for line in block.lines() {
                    if let Some(name) = line.strip_prefix("event:") {
                        event = Some(name.trim_start().to_string());
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
                    }
                }
                event.map(|e| (e, data.join("\n")))
            })
            .collect()
    }
}

/// Test configuration: no Ollama, no rate limiting, no streaming delay
pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            tls: None,
            static_dir: None,
            serve_frontend: false,
        },
        ollama: None,
        qa: QaConfig {
            stream_delay_ms: 0,
            ..QaConfig::default()
        },
        rate_limit: RateLimitSettings {
            enabled: false,
            ..RateLimitSettings::default()
        },
        logging: LoggingConfig::default(),
        ..AppConfig::default()
    }
}
