//! WebSocket ingest: the entry point for pushed meeting audio.
//!
//! The protocol is one-directional; the platform pushes frames, we never
//! respond. Per-frame problems are logged and that single message dropped;
//! the connection and session always survive them. Closing the connection is
//! the only teardown signal.

use super::messages::{self, AudioEventData, IngestMessage};
use super::state::AppState;
use crate::session::SessionHandle;
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// GET /stream: upgrade to the audio push socket.
pub async fn stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// The session a connection is bound to, fixed by its first audio message.
struct Binding {
    recording_id: String,
    bot_id: String,
    session: Arc<SessionHandle>,
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    info!("ingest connection opened");

    let mut binding: Option<Binding> = None;

    while let Some(message) = socket.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                warn!("ingest connection error: {}", e);
                break;
            }
        };

        match message {
            Message::Text(text) => {
                handle_text(&state, &mut binding, &text).await;
            }
            Message::Close(_) => break,
            // The platform only sends JSON text; axum answers pings itself.
            _ => {}
        }
    }

    // Flush-and-teardown, exactly once. A None from remove means another
    // path (process shutdown) already detached the session; that is a no-op
    // here, not a failure.
    if let Some(binding) = binding {
        info!(recording_id = %binding.recording_id, "ingest connection closed");
        if let Some(session) = state.registry.remove(&binding.recording_id).await {
            session.finish().await;
        }
    } else {
        info!("ingest connection closed before any audio arrived");
    }
}

async fn handle_text(state: &AppState, binding: &mut Option<Binding>, text: &str) {
    match messages::parse_message(text) {
        Ok(IngestMessage::Audio(data)) => handle_audio(state, binding, data).await,
        Ok(IngestMessage::Ignored(event)) => {
            debug!(event = %event, "ignoring event");
        }
        Err(e) => {
            let recording_id = binding
                .as_ref()
                .map(|b| b.recording_id.as_str())
                .unwrap_or("<unbound>");
            warn!(recording_id = %recording_id, error = %e, "dropping message");
        }
    }
}

async fn handle_audio(state: &AppState, binding: &mut Option<Binding>, data: AudioEventData) {
    // First audio message binds the connection to its recording.
    if binding.is_none() {
        let recording_id = data
            .recording
            .as_ref()
            .map(|r| r.id.clone())
            .unwrap_or_else(|| format!("conn-{}", uuid::Uuid::new_v4()));
        let bot_id = data
            .bot
            .as_ref()
            .map(|b| b.id.clone())
            .unwrap_or_else(|| recording_id.clone());

        let session = state.registry.get_or_create(&recording_id).await;
        info!(recording_id = %recording_id, bot_id = %bot_id, "connection bound");

        *binding = Some(Binding {
            recording_id,
            bot_id,
            session,
        });
    }
    let Some(bound) = binding.as_ref() else {
        return;
    };

    let (frame, raw_bytes) = match data.decode() {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(recording_id = %bound.recording_id, error = %e, "dropping frame");
            return;
        }
    };

    // Durability copy, independent of the transcription path: a persistence
    // failure is logged and must never block or fail ingest.
    {
        let store = Arc::clone(&state.store);
        let bot_id = bound.bot_id.clone();
        let timestamp = frame.timestamp;
        tokio::spawn(async move {
            if let Err(e) = store.store(&bot_id, &raw_bytes, timestamp).await {
                warn!(error = %e, "chunk not persisted");
            }
        });
    }

    {
        let mut buffer = bound.session.buffer().await;
        if let Err(e) = buffer.append(&frame) {
            // The discarded span is permanently missing from the transcript
            // and the stored history; the log line is the record of the gap.
            warn!(
                error = %e,
                offset = buffer.sample_count(),
                "dropping out-of-order frame"
            );
            return;
        }
    }

    let config = state.registry.config();
    loop {
        let window = {
            let mut buffer = bound.session.buffer().await;
            buffer.take_window(config.window_seconds, config.overlap_seconds)
        };
        match window {
            Some(window) => bound.session.dispatch(window).await,
            None => break,
        }
    }
}
