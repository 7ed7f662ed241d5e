//! Test utilities for integration tests
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};

use parley::api::{AppState, app};
use parley::core::AppConfig;

/// Creates a test application router pointed at the given model
/// endpoint hostname (usually a mockito server), along with the shared
/// state so tests can inspect sessions directly.
pub fn test_app(api_hostname: &str) -> (Router, Arc<AppState>) {
    let config = AppConfig {
        genai_api_hostname: api_hostname.to_string(),
        genai_api_key: String::from("test-api-key"),
        genai_model: String::from("gemini-test"),
    };
    let state = Arc::new(AppState::new(config));
    (app(Arc::clone(&state)), state)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("Response body was not valid UTF-8")
}
