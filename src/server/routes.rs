use super::handlers;
use super::state::AppState;
use super::ws;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Create the router: the WebSocket ingest endpoint plus the read-only
/// observability routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Audio push from the meeting-bot platform
        .route("/stream", get(ws::stream_handler))
        // Health check
        .route("/health", get(handlers::health_check))
        // Observability
        .route("/sessions", get(handlers::list_sessions))
        .route(
            "/transcripts/:recording_id",
            get(handlers::get_transcript),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
