use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::mpsc;

/// Hostname of the hosted generation API.
pub const DEFAULT_API_HOSTNAME: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Errors from one streaming generation request, split by whether the
/// failure happened while establishing the connection or mid-stream.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("connecting to the model endpoint failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("model endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("response stream failed: {0}")]
    Stream(#[source] reqwest::Error),

    #[error("response stream was not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed stream event: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl EndpointError {
    /// True when the request failed before the response stream produced
    /// anything.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Status { .. })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Sends `user_text` as one complete turn and forwards each text
/// fragment of the streamed reply to `tx` in delivery order. Returns
/// once the model signals the end of the turn or the stream ends.
pub async fn stream_generate(
    tx: mpsc::UnboundedSender<String>,
    user_text: &str,
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<(), EndpointError> {
    let payload = json!({
        "contents": [{"role": "user", "parts": [{"text": user_text}]}],
        "generationConfig": {"responseModalities": ["TEXT"]},
    });
    let url = format!(
        "{}/v1beta/models/{}:streamGenerateContent",
        api_hostname.trim_end_matches('/'),
        model
    );
    let response = reqwest::Client::new()
        .post(url)
        .query(&[("alt", "sse")])
        .header("x-goog-api-key", api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60 * 5))
        .json(&payload)
        .send()
        .await
        .map_err(EndpointError::Connect)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|resp| resp.error.message)
            .unwrap_or(body);
        return Err(EndpointError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let mut stream = response.bytes_stream();
    let mut buffer = String::new();

    'outer: while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(EndpointError::Stream)?;
        let chunk_str = std::str::from_utf8(&chunk)?;

        // Append new data to buffer. This is necessary to handle SSE
        // events fragmented over HTTP/2 frames.
        buffer.push_str(chunk_str);

        // Process all complete SSE events from the buffer
        while let Some(event_end) = buffer.find("\n\n") {
            let event_data = buffer[..event_end].to_string();
            buffer = buffer[event_end + 2..].to_string();

            let event_data = event_data.trim();
            if event_data.is_empty() || !event_data.starts_with("data: ") {
                continue;
            }

            // Extract the JSON payload (after "data: ")
            let data = event_data[6..].trim();
            if data.is_empty() {
                continue;
            }

            let chunk = serde_json::from_str::<GenerateChunk>(data).inspect_err(|e| {
                tracing::error!("Parsing generation chunk failed for {}\nError: {}", data, e)
            })?;

            let Some(candidate) = chunk.candidates.first() else {
                continue;
            };

            if let Some(content) = &candidate.content {
                for part in &content.parts {
                    if let Some(text) = &part.text {
                        if !text.is_empty() {
                            // A closed receiver is not a stream failure;
                            // keep draining so the turn's result stays
                            // accurate.
                            let _ = tx.send(text.clone());
                        }
                    }
                }
            }

            // The model signals the end of the turn on the last chunk
            if candidate.finish_reason.is_some() {
                break 'outer;
            }
        }
    }

    Ok(())
}
