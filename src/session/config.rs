use serde::{Deserialize, Serialize};

/// Configuration for session windowing and dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sample rate of inbound audio (the platform pushes 16 kHz)
    pub sample_rate: u32,

    /// Window length handed to the transcription engine, in seconds
    pub window_seconds: f64,

    /// Overlap carried between consecutive windows, in seconds
    pub overlap_seconds: f64,

    /// When true, a session's ingest loop waits for its in-flight window to
    /// be accepted before reading more frames (bounded queue). When false the
    /// queue is unbounded: ingest never waits, at the cost of buffer growth
    /// if the engine falls behind.
    pub backpressure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000, // Whisper expects 16kHz
            window_seconds: 5.0,
            overlap_seconds: 1.0,
            backpressure: false,
        }
    }
}
