//! Ingest endpoint and observability surface
//!
//! Routes:
//! - GET /stream - WebSocket upgrade; the platform pushes audio frames here
//! - GET /health - health check
//! - GET /sessions - recording ids of live sessions
//! - GET /transcripts/:recording_id - transcript emitted so far for a session

mod handlers;
pub mod messages;
mod routes;
mod state;
mod ws;

pub use routes::create_router;
pub use state::AppState;
