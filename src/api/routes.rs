//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Streaming answers
        .route("/chat", post(handlers::chat))
        // Conversation memory
        .route(
            "/sessions/:id",
            get(handlers::get_session).delete(handlers::reset_session),
        )
        .with_state(state)
}
