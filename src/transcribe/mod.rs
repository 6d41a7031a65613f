//! Speech-to-text pipeline stage
//!
//! This module provides:
//! - The `SpeechEngine` trait seam and its Whisper / mock implementations
//! - The `TranscriptionWorker` that turns windows into timestamped segments
//! - `TranscriptSink` implementations for emitting segments

mod engine;
mod segment;
mod sink;
mod worker;

pub use engine::{EngineConfig, EngineSegment, MockEngine, ModelSize, SpeechEngine, WhisperEngine};
pub use segment::TranscriptSegment;
pub use sink::{ChannelSink, LogSink, TranscriptSink};
pub use worker::TranscriptionWorker;
