//! In-memory chunk store for tests.

use super::{ChunkStore, StoredChunk};
use crate::audio::FrameTimestamp;
use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// HashMap-backed store preserving insertion order per bot id.
///
/// `with_read_failure` turns every fetch into a `PersistenceRead` error, for
/// exercising the export abort path.
#[derive(Default)]
pub struct MemoryChunkStore {
    chunks: Mutex<HashMap<String, Vec<StoredChunk>>>,
    fail_reads: bool,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_read_failure() -> Self {
        Self {
            chunks: Mutex::new(HashMap::new()),
            fail_reads: true,
        }
    }
}

#[async_trait::async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn store(&self, bot_id: &str, buffer: &[u8], timestamp: FrameTimestamp) -> Result<()> {
        let chunk = StoredChunk {
            bot_id: bot_id.to_string(),
            buffer: buffer.to_vec(),
            timestamp,
        };
        self.chunks
            .lock()
            .await
            .entry(bot_id.to_string())
            .or_default()
            .push(chunk);
        Ok(())
    }

    async fn fetch_ordered(&self, bot_id: &str) -> Result<Vec<StoredChunk>> {
        if self.fail_reads {
            return Err(PipelineError::PersistenceRead {
                bot_id: bot_id.to_string(),
                message: "simulated read failure".to_string(),
            });
        }

        Ok(self
            .chunks
            .lock()
            .await
            .get(bot_id)
            .cloned()
            .unwrap_or_default())
    }
}
