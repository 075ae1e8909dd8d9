//! API request handlers

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::api::types::ApiResponse;
use crate::api::types::HealthResponse;
use tokio::sync::Semaphore;

use crate::rag::RagService;

pub mod chat;
pub mod session;

pub use chat::*;
pub use session::*;

/// Upper bound on answer streams in flight; each one holds upstream connections
pub const MAX_CONCURRENT_STREAMS: usize = 64;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rag: RagService,
    /// One permit per open answer stream, held until its body ends or the client leaves
    pub streams: Arc<Semaphore>,
}

impl AppState {
    pub fn new(rag: RagService) -> Self {
        Self::with_stream_limit(rag, MAX_CONCURRENT_STREAMS)
    }

    pub fn with_stream_limit(rag: RagService, limit: usize) -> Self {
        Self {
            rag,
            streams: Arc::new(Semaphore::new(limit)),
        }
    }
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.rag.history().session_count(),
    }))
}
