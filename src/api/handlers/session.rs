//! Session history handlers

use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::*;
use crate::rag::Session;

/// Get a session's turns (GET /api/sessions/:id)
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> (StatusCode, Json<ApiResponse<Session>>) {
    info!("GET /api/sessions/{}", session_id);

    match state.rag.history().session(&session_id) {
        Some(session) => (StatusCode::OK, Json(ApiResponse::success(session))),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("session '{session_id}' not found"))),
        ),
    }
}

/// Clear a session's history (DELETE /api/sessions/:id)
pub async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<ApiResponse<ResetResponse>> {
    info!("DELETE /api/sessions/{}", session_id);

    let cleared = state.rag.history().reset(&session_id);
    Json(ApiResponse::success(ResetResponse {
        session_id,
        cleared,
    }))
}
