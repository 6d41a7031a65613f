use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamps attached to an inbound audio frame.
///
/// The meeting-bot platform sends both clocks with every frame; the relative
/// clock orders samples within a recording, the absolute clock is kept for
/// operator debugging and stored alongside each persisted chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTimestamp {
    /// Seconds since the recording started
    pub relative: f64,
    /// Wall-clock instant the frame was produced
    pub absolute: DateTime<Utc>,
}

/// One decoded inbound audio frame (16-bit PCM, 16 kHz mono).
///
/// Immutable once decoded; the ingest path appends its samples to the session
/// buffer and forwards its raw bytes to the chunk store.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM)
    pub samples: Vec<i16>,
    /// Relative + absolute timestamps from the wire envelope
    pub timestamp: FrameTimestamp,
}

impl AudioFrame {
    /// Duration of this frame at the given sample rate.
    pub fn duration_seconds(&self, sample_rate: u32) -> f64 {
        self.samples.len() as f64 / sample_rate as f64
    }
}
