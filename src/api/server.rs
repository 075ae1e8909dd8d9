use axum::Router;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::rag::RagService;
use crate::Result;

/// Build the application router
pub fn build_app(state: AppState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

pub async fn serve_api(
    rag: RagService,
    host: &str,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("🚀 Starting TaxRAG API server...");

    let app = build_app(AppState::new(rag), enable_cors);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET    /api/health        - Health check");
    info!("  POST   /api/chat          - Streamed answer (text/event-stream)");
    info!("  GET    /api/sessions/:id  - Conversation history");
    info!("  DELETE /api/sessions/:id  - Reset conversation");

    axum::serve(listener, app).await?;

    Ok(())
}
