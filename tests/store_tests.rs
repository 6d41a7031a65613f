// Integration tests for the sled-backed chunk store
//
// The wire protocol has no sequence numbers, so insertion order is the only
// ordering key; these tests verify it survives interleaved bots and a
// close/reopen of the database.

use chrono::Utc;
use meetscribe::{ChunkStore, FrameTimestamp, SledChunkStore};

fn ts(relative: f64) -> FrameTimestamp {
    FrameTimestamp {
        relative,
        absolute: Utc::now(),
    }
}

#[tokio::test]
async fn fetch_returns_chunks_in_insertion_order() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = SledChunkStore::open(dir.path().join("chunks")).unwrap();

    for i in 0u8..50 {
        store.store("bot-1", &[i, i], ts(i as f64 * 0.1)).await.unwrap();
    }

    let chunks = store.fetch_ordered("bot-1").await.unwrap();
    assert_eq!(chunks.len(), 50);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.buffer, vec![i as u8, i as u8], "chunk {} out of order", i);
        assert_eq!(chunk.bot_id, "bot-1");
    }
}

#[tokio::test]
async fn bots_are_isolated() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = SledChunkStore::open(dir.path().join("chunks")).unwrap();

    // Interleave writes for two bots
    for i in 0u8..10 {
        store.store("bot-a", &[1, i], ts(i as f64)).await.unwrap();
        store.store("bot-b", &[2, i], ts(i as f64)).await.unwrap();
    }

    let a = store.fetch_ordered("bot-a").await.unwrap();
    let b = store.fetch_ordered("bot-b").await.unwrap();

    assert_eq!(a.len(), 10);
    assert_eq!(b.len(), 10);
    assert!(a.iter().all(|c| c.buffer[0] == 1));
    assert!(b.iter().all(|c| c.buffer[0] == 2));
}

#[tokio::test]
async fn unknown_bot_fetches_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = SledChunkStore::open(dir.path().join("chunks")).unwrap();

    let chunks = store.fetch_ordered("bot-none").await.unwrap();
    assert!(chunks.is_empty());
}

#[tokio::test]
async fn order_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("chunks");

    {
        let store = SledChunkStore::open(&path).unwrap();
        for i in 0u8..5 {
            store.store("bot-1", &[i], ts(i as f64)).await.unwrap();
        }
    }

    let store = SledChunkStore::open(&path).unwrap();
    // Appends after reopen still land after the existing chunks
    for i in 5u8..10 {
        store.store("bot-1", &[i], ts(i as f64)).await.unwrap();
    }

    let chunks = store.fetch_ordered("bot-1").await.unwrap();
    assert_eq!(chunks.len(), 10);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.buffer, vec![i as u8]);
    }
}

#[tokio::test]
async fn timestamps_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = SledChunkStore::open(dir.path().join("chunks")).unwrap();

    let timestamp = ts(12.345);
    store.store("bot-1", &[0, 0], timestamp).await.unwrap();

    let chunks = store.fetch_ordered("bot-1").await.unwrap();
    assert_eq!(chunks[0].timestamp.relative, 12.345);
    assert_eq!(chunks[0].timestamp.absolute, timestamp.absolute);
}
