//! Public types for the chat API
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::Message;

#[derive(Deserialize)]
pub struct ChatRequest {
    /// Omitted on the first turn; the server mints an id and announces
    /// it in the first stream event.
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Deserialize)]
pub struct ChatSessionsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Serialize, Clone)]
pub struct ChatSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub messages: usize,
}

#[derive(Serialize)]
pub struct ChatSessionsResponse {
    pub sessions: Vec<ChatSession>,
    pub page: usize,
    pub limit: usize,
    pub total_sessions: usize,
    pub total_pages: usize,
}

#[derive(Serialize)]
pub struct ChatTranscriptResponse {
    pub transcript: Vec<Message>,
}

/// Events delivered to the page over the SSE stream for one turn.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Announces the turn's session id, minted server-side when the
    /// request carried none.
    Session { id: String },
    /// The accumulated reply text so far; replaces the live region.
    Delta { text: String },
    /// The final reply text after the turn was committed.
    Done { text: String },
    Error { message: String },
}

impl StreamEvent {
    pub fn to_data(&self) -> String {
        serde_json::to_string(self).expect("Failed to serialize stream event")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_event_serialization() {
        let event = StreamEvent::Session {
            id: "abc".to_string(),
        };
        assert_eq!(event.to_data(), r#"{"type":"session","id":"abc"}"#);

        let event = StreamEvent::Delta {
            text: "Hi there".to_string(),
        };
        assert_eq!(event.to_data(), r#"{"type":"delta","text":"Hi there"}"#);

        let event = StreamEvent::Error {
            message: "boom".to_string(),
        };
        assert_eq!(event.to_data(), r#"{"type":"error","message":"boom"}"#);
    }
}
