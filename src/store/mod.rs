//! Durable chunk storage
//!
//! Every received audio chunk is appended here, independent of the
//! transcription path. The wire protocol carries no sequence numbers, so
//! insertion order is the ordering key: `fetch_ordered` must return chunks in
//! exactly the order they were stored.

mod memory;
mod sled;

pub use self::memory::MemoryChunkStore;
pub use self::sled::SledChunkStore;

use crate::audio::FrameTimestamp;
use crate::error::Result;

/// One durably stored audio chunk.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub bot_id: String,
    /// Raw PCM16LE bytes as received
    pub buffer: Vec<u8>,
    pub timestamp: FrameTimestamp,
}

/// Ordered append-only chunk storage, keyed by bot id.
///
/// No deletion or update operations: the core only ever appends and reads
/// back the full history.
#[async_trait::async_trait]
pub trait ChunkStore: Send + Sync {
    /// Durably append one chunk for `bot_id`.
    async fn store(&self, bot_id: &str, buffer: &[u8], timestamp: FrameTimestamp) -> Result<()>;

    /// All chunks for `bot_id`, in the order they were stored.
    async fn fetch_ordered(&self, bot_id: &str) -> Result<Vec<StoredChunk>>;
}
