//! Router for the chat API

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, sse::Event, sse::KeepAlive, sse::Sse},
    routing::{get, post},
};
use axum_extra::extract::Query;
use tokio::sync::mpsc;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use super::public;
use crate::api::state::AppState;
use crate::chat::{TurnController, TurnOutcome};

type SharedState = Arc<AppState>;

/// Get a single chat session's transcript by ID
async fn chat_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let Some(session) = state.sessions.get(&id) else {
        return Ok((
            StatusCode::NOT_FOUND,
            format!("Chat session {} not found", id),
        )
            .into_response());
    };

    Ok(axum::Json(public::ChatTranscriptResponse {
        transcript: session.messages(),
    })
    .into_response())
}

/// Get a list of all chat sessions
async fn chat_list(
    State(state): State<SharedState>,
    Query(params): Query<public::ChatSessionsQuery>,
) -> Result<axum::Json<public::ChatSessionsResponse>, crate::api::public::ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).max(1);
    let offset = (page - 1) * limit;

    let all = state.sessions.list();
    let total_sessions = all.len();
    let total_pages = total_sessions.div_ceil(limit);
    let sessions = all
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|info| public::ChatSession {
            id: info.id,
            created_at: info.created_at,
            messages: info.messages,
        })
        .collect();

    Ok(axum::Json(public::ChatSessionsResponse {
        sessions,
        page,
        limit,
        total_sessions,
        total_pages,
    }))
}

/// Run one chat turn and stream the reply as it accumulates
async fn chat_handler(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::ChatRequest>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    // Whitespace-only input is dropped without touching the session or
    // the model endpoint.
    if payload.message.trim().is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let session_id = payload
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let session = state.sessions.get_or_create(&session_id);

    // Fast rejection before the stream starts. The controller holds the
    // authoritative gate; losing a race here only means the rejection
    // arrives as an error event instead of a status code.
    if session.turn_in_flight() {
        return Ok((
            StatusCode::CONFLICT,
            format!("A turn is already in flight for session {}", session_id),
        )
            .into_response());
    }

    let controller = TurnController::new(&state.config);

    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let sse_stream = UnboundedReceiverStream::new(rx)
        .map(|chunk| Ok::<Event, Infallible>(Event::default().data(chunk)));

    tokio::spawn(async move {
        let _ = tx.send(
            public::StreamEvent::Session {
                id: session_id.clone(),
            }
            .to_data(),
        );

        let result = controller
            .run_turn(&session, &payload.message, |text| {
                let _ = tx.send(
                    public::StreamEvent::Delta {
                        text: text.to_string(),
                    }
                    .to_data(),
                );
            })
            .await;

        match result {
            Ok(TurnOutcome::Completed(reply)) => {
                let _ = tx.send(public::StreamEvent::Done { text: reply.text }.to_data());
            }
            Ok(TurnOutcome::Ignored) => {}
            Err(e) => {
                tracing::error!("Chat turn failed for session {}: {}", session_id, e);
                let _ = tx.send(
                    public::StreamEvent::Error {
                        message: e.to_string(),
                    }
                    .to_data(),
                );
            }
        }
    });

    let resp = Sse::new(sse_stream)
        .keep_alive(
            KeepAlive::default()
                .text("keep-alive")
                .interval(Duration::from_millis(100)),
        )
        .into_response();

    Ok(resp)
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/{id}", get(chat_session))
        .route("/sessions", get(chat_list))
}
