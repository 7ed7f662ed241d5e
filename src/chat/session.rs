//! Session handles owning a transcript, and the registry the HTTP
//! surface uses to key live sessions by id.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::TurnError;
use super::models::{Message, Transcript};

/// One interactive chat session. The transcript sits behind its own
/// lock so history reads never wait on an in-flight turn; the turn gate
/// is held for the full duration of a turn, making the
/// one-turn-in-flight rule explicit rather than assumed.
pub struct Session {
    transcript: RwLock<Transcript>,
    turn_gate: Arc<Mutex<()>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            transcript: RwLock::new(Transcript::new()),
            turn_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Claims the session's turn slot, failing when another turn is
    /// already running. The slot frees when the returned guard drops.
    pub fn begin_turn(&self) -> Result<TurnGuard, TurnError> {
        let guard = Arc::clone(&self.turn_gate)
            .try_lock_owned()
            .map_err(|_| TurnError::TurnInFlight)?;
        Ok(TurnGuard { _guard: guard })
    }

    /// True while a turn is running.
    pub fn turn_in_flight(&self) -> bool {
        self.turn_gate.try_lock().is_err()
    }

    pub fn append(&self, msg: Message) {
        self.transcript
            .write()
            .expect("Transcript lock poisoned")
            .append(msg);
    }

    /// Ordered snapshot of the session's history.
    pub fn messages(&self) -> Vec<Message> {
        self.transcript
            .read()
            .expect("Transcript lock poisoned")
            .messages()
    }

    pub fn message_count(&self) -> usize {
        self.transcript
            .read()
            .expect("Transcript lock poisoned")
            .len()
    }
}

/// Held for the duration of one turn.
pub struct TurnGuard {
    _guard: OwnedMutexGuard<()>,
}

struct SessionEntry {
    session: Arc<Session>,
    created_at: DateTime<Utc>,
}

/// In-memory map of live sessions keyed by id. Sessions last for the
/// lifetime of the process; nothing is persisted.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, SessionEntry>>>,
}

#[derive(Clone, Debug)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub messages: usize,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.inner
            .read()
            .expect("Session registry lock poisoned")
            .get(id)
            .map(|entry| Arc::clone(&entry.session))
    }

    pub fn get_or_create(&self, id: &str) -> Arc<Session> {
        if let Some(session) = self.get(id) {
            return session;
        }

        let mut sessions = self
            .inner
            .write()
            .expect("Session registry lock poisoned");
        let entry = sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionEntry {
                session: Arc::new(Session::new()),
                created_at: Utc::now(),
            });
        Arc::clone(&entry.session)
    }

    /// Summaries of all live sessions, newest first.
    pub fn list(&self) -> Vec<SessionInfo> {
        let sessions = self
            .inner
            .read()
            .expect("Session registry lock poisoned");
        let mut infos: Vec<SessionInfo> = sessions
            .iter()
            .map(|(id, entry)| SessionInfo {
                id: id.clone(),
                created_at: entry.created_at,
                messages: entry.session.message_count(),
            })
            .collect();
        infos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        infos
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("Session registry lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_gate_rejects_second_claim() {
        let session = Session::new();

        let first = session.begin_turn();
        assert!(first.is_ok());
        assert!(session.turn_in_flight());

        let second = session.begin_turn();
        assert!(matches!(second, Err(TurnError::TurnInFlight)));
    }

    #[test]
    fn test_turn_gate_frees_when_guard_drops() {
        let session = Session::new();

        {
            let _turn = session.begin_turn().unwrap();
            assert!(session.turn_in_flight());
        }

        assert!(!session.turn_in_flight());
        assert!(session.begin_turn().is_ok());
    }

    #[test]
    fn test_session_appends_in_order() {
        let session = Session::new();
        session.append(Message::user("hello"));
        session.append(Message::ai("hi"));

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[1].text, "hi");
    }

    #[test]
    fn test_registry_reuses_existing_sessions() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());

        let first = registry.get_or_create("abc");
        first.append(Message::user("hello"));

        let second = registry.get_or_create("abc");
        assert_eq!(second.message_count(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_get_unknown_session() {
        let registry = SessionRegistry::new();
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_registry_list_counts_messages() {
        let registry = SessionRegistry::new();
        registry.get_or_create("a").append(Message::user("one"));
        registry.get_or_create("b");

        let infos = registry.list();
        assert_eq!(infos.len(), 2);
        let by_id = |id: &str| infos.iter().find(|i| i.id == id).unwrap().messages;
        assert_eq!(by_id("a"), 1);
        assert_eq!(by_id("b"), 0);
    }
}
