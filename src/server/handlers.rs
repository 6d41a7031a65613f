use super::state::AppState;
use crate::error::PipelineError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /sessions
/// Recording ids of all live sessions
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let active = state.registry.list_active().await;
    (StatusCode::OK, Json(active))
}

/// GET /transcripts/:recording_id
/// Transcript segments emitted so far for a live session
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
) -> impl IntoResponse {
    match state.registry.get(&recording_id).await {
        Some(session) => {
            let transcript = session.transcript().await;
            (StatusCode::OK, Json(transcript)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: PipelineError::SessionNotFound { recording_id }.to_string(),
            }),
        )
            .into_response(),
    }
}
