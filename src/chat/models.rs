//! The core models for a chat session's message history.
use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Ai,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: &str) -> Self {
        Self {
            sender: Sender::User,
            text: text.to_string(),
        }
    }

    pub fn ai(text: &str) -> Self {
        Self {
            sender: Sender::Ai,
            text: text.to_string(),
        }
    }
}

/// An append-only log of messages for one session. Ordering is append
/// order and entries are never edited or removed.
#[derive(Default)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn append(&mut self, msg: Message) {
        self.0.push(msg)
    }

    /// The full ordered history for rendering.
    pub fn messages(&self) -> Vec<Message> {
        self.0.clone()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_serialization() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), r#""user""#);
        assert_eq!(serde_json::to_string(&Sender::Ai).unwrap(), r#""ai""#);
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::user("hello");
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"sender":"user","text":"hello"}"#
        );

        let msg = Message::ai("Hi there!");
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"sender":"ai","text":"Hi there!"}"#
        );
    }

    #[test]
    fn test_message_deserialization() {
        let msg: Message = serde_json::from_str(r#"{"sender":"ai","text":"ok"}"#).unwrap();
        assert_eq!(msg.sender, Sender::Ai);
        assert_eq!(msg.text, "ok");
    }

    #[test]
    fn test_transcript_preserves_append_order() {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("first"));
        transcript.append(Message::ai("second"));
        transcript.append(Message::user("third"));

        let texts: Vec<&str> = transcript.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_transcript_snapshots_are_stable() {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("hello"));
        transcript.append(Message::ai("world"));

        assert_eq!(transcript.messages(), transcript.messages());
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_transcript_starts_empty() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert!(transcript.messages().is_empty());
    }
}
