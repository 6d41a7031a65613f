//! Transcription worker: window in, timestamped segments out.
//!
//! The engine call is the one CPU/GPU-bound step in the pipeline. It runs on a
//! blocking thread behind a semaphore so at most `concurrency` inferences run
//! at once, and a failed window is logged and skipped without tearing down the
//! session that produced it.

use super::engine::SpeechEngine;
use super::segment::TranscriptSegment;
use super::sink::TranscriptSink;
use crate::error::PipelineError;
use crate::session::Window;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;

pub struct TranscriptionWorker {
    engine: Arc<dyn SpeechEngine>,
    sink: Arc<dyn TranscriptSink>,
    limiter: Arc<Semaphore>,
    sample_rate: u32,
}

impl TranscriptionWorker {
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        sink: Arc<dyn TranscriptSink>,
        concurrency: usize,
        sample_rate: u32,
    ) -> Self {
        Self {
            engine,
            sink,
            limiter: Arc::new(Semaphore::new(concurrency.max(1))),
            sample_rate,
        }
    }

    /// Transcribe one window and emit its segments.
    ///
    /// Engine timestamps are relative to the window start; they are re-based
    /// here onto the session timeline using the window's sample offset. A
    /// failure skips this window only: the returned list is empty and the
    /// caller continues with the next window.
    pub async fn process(&self, recording_id: &str, window: Window) -> Vec<TranscriptSegment> {
        if window.samples.is_empty() {
            return Vec::new();
        }

        let permit = match self.limiter.clone().acquire_owned().await {
            Ok(permit) => permit,
            // Semaphore closed only happens during process shutdown.
            Err(_) => return Vec::new(),
        };

        let engine = Arc::clone(&self.engine);
        let start_offset = window.start_offset;
        let samples = window.samples;

        let outcome = tokio::task::spawn_blocking(move || {
            let result = engine.transcribe(&samples);
            drop(permit);
            result
        })
        .await;

        let engine_segments = match outcome {
            Ok(Ok(segments)) => segments,
            Ok(Err(e)) => {
                let failure = PipelineError::TranscriptionFailure {
                    recording_id: recording_id.to_string(),
                    offset: start_offset,
                    message: e.to_string(),
                };
                warn!(error = %failure, "window skipped");
                return Vec::new();
            }
            Err(join_error) => {
                let failure = PipelineError::TranscriptionFailure {
                    recording_id: recording_id.to_string(),
                    offset: start_offset,
                    message: format!("engine task panicked: {}", join_error),
                };
                warn!(error = %failure, "window skipped");
                return Vec::new();
            }
        };

        let window_start_seconds = start_offset as f64 / self.sample_rate as f64;

        let mut emitted = Vec::new();
        for segment in engine_segments {
            let text = segment.text.trim();
            if text.is_empty() {
                continue;
            }
            let segment = TranscriptSegment {
                recording_id: recording_id.to_string(),
                text: text.to_string(),
                start_time: window_start_seconds + segment.start,
                end_time: window_start_seconds + segment.end,
            };
            self.sink.emit(&segment).await;
            emitted.push(segment);
        }

        emitted
    }
}
