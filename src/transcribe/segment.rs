use serde::{Deserialize, Serialize};

/// A single transcript segment on the session's absolute timeline.
///
/// Append-only: never mutated after emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Recording this segment belongs to
    pub recording_id: String,

    /// Transcribed text
    pub text: String,

    /// Segment start, seconds since the recording began
    pub start_time: f64,

    /// Segment end, seconds since the recording began
    pub end_time: f64,
}
