//! Per-recording sample accumulator.
//!
//! Appends incoming frames in arrival order and hands out fixed-size windows
//! for transcription. Consecutive windows share an overlap region so the
//! engine keeps word-boundary context, but the consumed offset only ever
//! advances by the non-overlapping portion; overlapped samples are reused,
//! never double-counted.

use crate::audio::AudioFrame;
use crate::error::{PipelineError, Result};
use chrono::{DateTime, Utc};

/// A contiguous span of accumulated samples handed to the transcription
/// engine in one call.
#[derive(Debug, Clone)]
pub struct Window {
    /// Samples in the window, overlap included
    pub samples: Vec<i16>,
    /// Index into the session's sample history of `samples[0]`, used to
    /// re-base engine timestamps onto the session timeline
    pub start_offset: usize,
}

/// Append-only sample history plus transcription progress for one recording.
pub struct SessionBuffer {
    recording_id: String,
    sample_rate: u32,
    samples: Vec<i16>,
    /// Everything before this index has been consumed by a window
    transcribed_offset: usize,
    /// Latest relative timestamp appended; frames may not go backwards
    latest_relative: Option<f64>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl SessionBuffer {
    pub fn new(recording_id: String, sample_rate: u32) -> Self {
        let now = Utc::now();
        Self {
            recording_id,
            sample_rate,
            samples: Vec::new(),
            transcribed_offset: 0,
            latest_relative: None,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn recording_id(&self) -> &str {
        &self.recording_id
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn transcribed_offset(&self) -> usize {
        self.transcribed_offset
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    /// Append a frame's samples to the history.
    ///
    /// A frame whose relative timestamp is earlier than the latest appended
    /// one is rejected: the windowing math assumes monotonic time, and the
    /// wire protocol carries no sequence numbers to reorder against. The
    /// caller drops the frame and the gap stays visible in the transcript.
    pub fn append(&mut self, frame: &AudioFrame) -> Result<()> {
        if let Some(latest) = self.latest_relative {
            if frame.timestamp.relative < latest {
                return Err(PipelineError::OutOfOrderFrame {
                    recording_id: self.recording_id.clone(),
                    timestamp: frame.timestamp.relative,
                    latest,
                });
            }
        }

        self.latest_relative = Some(frame.timestamp.relative);
        self.samples.extend_from_slice(&frame.samples);
        self.last_activity_at = Utc::now();
        Ok(())
    }

    /// Take the next un-transcribed window, backdated by up to
    /// `overlap_seconds` for boundary context.
    ///
    /// Returns `None` until a full `window_seconds` of new samples is
    /// available; the caller waits for more data rather than padding with
    /// silence. The consumed offset advances by exactly the non-overlapping
    /// portion.
    pub fn take_window(&mut self, window_seconds: f64, overlap_seconds: f64) -> Option<Window> {
        let window_len = (window_seconds * self.sample_rate as f64) as usize;
        if window_len == 0 {
            return None;
        }
        let overlap_len = (overlap_seconds * self.sample_rate as f64) as usize;

        let available = self.samples.len() - self.transcribed_offset;
        if available < window_len {
            return None;
        }

        let start = self.transcribed_offset.saturating_sub(overlap_len);
        let end = self.transcribed_offset + window_len;

        let window = Window {
            samples: self.samples[start..end].to_vec(),
            start_offset: start,
        };

        self.transcribed_offset = end;
        Some(window)
    }

    /// Drain whatever un-transcribed tail exists, regardless of minimum
    /// window size. Called once on session teardown so the final seconds of
    /// speech are not silently dropped.
    pub fn flush_remainder(&mut self) -> Option<Window> {
        if self.transcribed_offset >= self.samples.len() {
            return None;
        }

        let start = self.transcribed_offset;
        let window = Window {
            samples: self.samples[start..].to_vec(),
            start_offset: start,
        };

        self.transcribed_offset = self.samples.len();
        Some(window)
    }
}
