//! Error types for the audio pipeline.
//!
//! Per-frame and per-window failures are recoverable: the offending message or
//! window is dropped and the session keeps running. Only read failures during
//! export are terminal, because a partial artifact would misrepresent the
//! recording.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    // Frame decoding errors (drop one message, connection survives)
    #[error("malformed frame: {reason}")]
    MalformedFrame { reason: String },

    #[error(
        "out-of-order frame for {recording_id}: relative timestamp {timestamp:.3}s \
         is earlier than latest {latest:.3}s"
    )]
    OutOfOrderFrame {
        recording_id: String,
        timestamp: f64,
        latest: f64,
    },

    // Transcription errors (skip one window, session survives)
    #[error("transcription failed for {recording_id} at sample offset {offset}: {message}")]
    TranscriptionFailure {
        recording_id: String,
        offset: usize,
        message: String,
    },

    #[error("speech engine unavailable: {message}")]
    EngineUnavailable { message: String },

    // Persistence errors
    #[error("failed to store chunk for bot {bot_id}: {message}")]
    PersistenceWrite { bot_id: String, message: String },

    #[error("failed to read stored chunks for bot {bot_id}: {message}")]
    PersistenceRead { bot_id: String, message: String },

    #[error("no audio stored for bot {bot_id}")]
    UnknownBot { bot_id: String },

    // Registry errors (teardown races resolve to a no-op)
    #[error("session not found: {recording_id}")]
    SessionNotFound { recording_id: String },
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, PipelineError>;
