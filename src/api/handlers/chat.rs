//! Streaming chat handler

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::Event;
use axum::response::sse::KeepAlive;
use axum::response::sse::Sse;
use axum::Json;
use futures::Stream;
use futures::StreamExt;
use tracing::error;
use tracing::info;
use uuid::Uuid;

use super::AppState;
use crate::api::types::*;

/// Answer a question as a server-sent event stream
///
/// Requests without a session id start a new session.
/// Events: `session` (id), `chunk` (`{text}`), then `done` or `error` (`{kind, stage, message}`).
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<
    Sse<impl Stream<Item = Result<Event, axum::Error>>>,
    (StatusCode, Json<ApiResponse<()>>),
> {
    if req.question.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("question must not be empty")),
        ));
    }

    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    info!("POST /api/chat (session {})", session_id);

    // Upstream calls run while the body streams, so the permit travels with it
    let permit = state
        .streams
        .clone()
        .acquire_owned()
        .await
        .map_err(|_| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::error("server is shutting down")),
            )
        })?;
    let mut answer = state.rag.ask(&req.question, &session_id);

    let events = async_stream::stream! {
        let _permit = permit;
        yield Ok(Event::default().event("session").data(session_id));

        while let Some(fragment) = answer.next().await {
            match fragment {
                Ok(text) => yield Event::default().event("chunk").json_data(ChunkEvent { text }),
                Err(e) => {
                    error!("Error streaming answer: {}", e);
                    yield Event::default().event("error").json_data(ErrorEvent::from(&e));
                    return;
                }
            }
        }

        yield Ok(Event::default().event("done").data("[DONE]"));
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
