pub mod audio;
pub mod config;
pub mod error;
pub mod export;
pub mod server;
pub mod session;
pub mod store;
pub mod transcribe;

pub use audio::{codec, AudioFrame, FrameTimestamp};
pub use config::Config;
pub use error::PipelineError;
pub use export::{AudioArtifact, Exporter, IntegrityConfig, IntegrityReport};
pub use server::{create_router, AppState};
pub use session::{SessionBuffer, SessionConfig, SessionHandle, SessionRegistry, Window};
pub use store::{ChunkStore, MemoryChunkStore, SledChunkStore, StoredChunk};
pub use transcribe::{
    ChannelSink, EngineConfig, LogSink, MockEngine, ModelSize, SpeechEngine, TranscriptSegment,
    TranscriptionWorker, WhisperEngine,
};
