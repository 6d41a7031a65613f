//! Sled-backed chunk store.
//!
//! Keys are `<bot_id> 0x00 <big-endian monotonic id>`, so a prefix scan over
//! one bot id iterates chunks in insertion order. The monotonic id comes from
//! the database itself; it exists only to keep keys unique and ordered and is
//! never exposed.

use super::{ChunkStore, StoredChunk};
use crate::audio::FrameTimestamp;
use crate::error::{PipelineError, Result};
use anyhow::Context;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// On-disk record format; the PCM buffer rides along as base64.
#[derive(Debug, Serialize, Deserialize)]
struct ChunkRecord {
    timestamp: FrameTimestamp,
    buffer: String,
}

pub struct SledChunkStore {
    db: sled::Db,
}

impl SledChunkStore {
    /// Open or create the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path)
            .with_context(|| format!("failed to open chunk store at {}", path.display()))?;

        info!("chunk store opened at {}", path.display());
        Ok(Self { db })
    }

    fn key(bot_id: &str, id: u64) -> Vec<u8> {
        let mut key = Vec::with_capacity(bot_id.len() + 9);
        key.extend_from_slice(bot_id.as_bytes());
        key.push(0);
        key.extend_from_slice(&id.to_be_bytes());
        key
    }

    fn prefix(bot_id: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(bot_id.len() + 1);
        prefix.extend_from_slice(bot_id.as_bytes());
        prefix.push(0);
        prefix
    }
}

#[async_trait::async_trait]
impl ChunkStore for SledChunkStore {
    async fn store(&self, bot_id: &str, buffer: &[u8], timestamp: FrameTimestamp) -> Result<()> {
        let write_error = |message: String| PipelineError::PersistenceWrite {
            bot_id: bot_id.to_string(),
            message,
        };

        let id = self.db.generate_id().map_err(|e| write_error(e.to_string()))?;

        let record = ChunkRecord {
            timestamp,
            buffer: base64::engine::general_purpose::STANDARD.encode(buffer),
        };
        let value = serde_json::to_vec(&record).map_err(|e| write_error(e.to_string()))?;

        self.db
            .insert(Self::key(bot_id, id), value)
            .map_err(|e| write_error(e.to_string()))?;

        Ok(())
    }

    async fn fetch_ordered(&self, bot_id: &str) -> Result<Vec<StoredChunk>> {
        let read_error = |message: String| PipelineError::PersistenceRead {
            bot_id: bot_id.to_string(),
            message,
        };

        let mut chunks = Vec::new();
        for entry in self.db.scan_prefix(Self::prefix(bot_id)) {
            let (_key, value) = entry.map_err(|e| read_error(e.to_string()))?;

            let record: ChunkRecord =
                serde_json::from_slice(&value).map_err(|e| read_error(e.to_string()))?;
            let buffer = base64::engine::general_purpose::STANDARD
                .decode(&record.buffer)
                .map_err(|e| read_error(e.to_string()))?;

            chunks.push(StoredChunk {
                bot_id: bot_id.to_string(),
                buffer,
                timestamp: record.timestamp,
            });
        }

        Ok(chunks)
    }
}
