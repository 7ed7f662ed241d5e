//! Orchestrates one request/response turn against a chat session.

use tokio::sync::mpsc;

use crate::core::AppConfig;
use crate::genai;

use super::accumulator::StreamingTurn;
use super::error::TurnError;
use super::models::Message;
use super::session::Session;

/// What to do when the model ends a turn without emitting any text.
///
/// `Commit` appends the empty reply to the transcript anyway; `Discard`
/// fails the turn with [`TurnError::EmptyReply`] so nothing beyond the
/// user message is committed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyReplyPolicy {
    #[default]
    Commit,
    Discard,
}

/// Result of a `run_turn` call that did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    /// The reply that was committed to the transcript.
    Completed(Message),
    /// The input was empty or whitespace-only; nothing ran.
    Ignored,
}

/// Runs chat turns: appends the user message, streams the model's reply
/// through an accumulator while refreshing the display after each
/// fragment, then commits the final message. A failed turn discards the
/// partial reply and commits nothing beyond the user message that
/// started it.
pub struct TurnController {
    api_hostname: String,
    api_key: String,
    model: String,
    empty_reply: EmptyReplyPolicy,
}

impl TurnController {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api_hostname: config.genai_api_hostname.clone(),
            api_key: config.genai_api_key.clone(),
            model: config.genai_model.clone(),
            empty_reply: EmptyReplyPolicy::default(),
        }
    }

    pub fn empty_reply_policy(mut self, policy: EmptyReplyPolicy) -> Self {
        self.empty_reply = policy;
        self
    }

    /// Runs one turn for `user_text` against `session`, invoking
    /// `render` with the accumulated reply text after each fragment
    /// arrives.
    ///
    /// Whitespace-only input is dropped without touching the session or
    /// the endpoint. The session's turn slot is held for the whole
    /// turn, so a second call on the same session fails with
    /// [`TurnError::TurnInFlight`].
    pub async fn run_turn<F>(
        &self,
        session: &Session,
        user_text: &str,
        mut render: F,
    ) -> Result<TurnOutcome, TurnError>
    where
        F: FnMut(&str),
    {
        if user_text.trim().is_empty() {
            return Ok(TurnOutcome::Ignored);
        }

        let _turn_slot = session.begin_turn()?;

        session.append(Message::user(user_text));

        let mut turn = StreamingTurn::begin();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let request = genai::stream_generate(
            tx,
            user_text,
            &self.api_hostname,
            &self.api_key,
            &self.model,
        );
        let drain = async {
            while let Some(fragment) = rx.recv().await {
                render(turn.fold(&fragment));
            }
        };
        // The request future owns the sender, so the drain side ends as
        // soon as the request completes, whether it succeeded or not.
        let (result, ()) = tokio::join!(request, drain);

        if let Err(err) = result {
            // The user message stays; the partial reply is dropped with
            // the accumulator.
            tracing::warn!("Turn failed, discarding partial reply: {}", err);
            return Err(err.into());
        }

        let text = turn.finish();
        if text.is_empty() && self.empty_reply == EmptyReplyPolicy::Discard {
            return Err(TurnError::EmptyReply);
        }

        let reply = Message::ai(&text);
        session.append(reply.clone());
        Ok(TurnOutcome::Completed(reply))
    }
}
