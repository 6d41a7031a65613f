// Integration tests for the session registry
//
// The registry map is the one resource shared by all ingest connections, so
// these tests focus on atomicity of creation, idempotent removal, and the
// no-identity-reuse rule across a close/reopen.

use meetscribe::{
    ChannelSink, MockEngine, SessionConfig, SessionRegistry, TranscriptionWorker,
};
use std::sync::Arc;

fn test_registry() -> Arc<SessionRegistry> {
    let (sink, _rx) = ChannelSink::new();
    let worker = Arc::new(TranscriptionWorker::new(
        Arc::new(MockEngine::new()),
        Arc::new(sink),
        2,
        16_000,
    ));
    Arc::new(SessionRegistry::new(SessionConfig::default(), worker))
}

#[tokio::test]
async fn get_or_create_returns_same_session() {
    let registry = test_registry();

    let first = registry.get_or_create("rec-1").await;
    let second = registry.get_or_create("rec-1").await;

    assert!(Arc::ptr_eq(&first, &second), "same id must map to same session");
}

#[tokio::test]
async fn concurrent_get_or_create_creates_exactly_one_session() {
    let registry = test_registry();

    let mut tasks = Vec::new();
    for _ in 0..32 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            registry.get_or_create("rec-contended").await
        }));
    }

    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.unwrap());
    }

    let first = &handles[0];
    for handle in &handles {
        assert!(
            Arc::ptr_eq(first, handle),
            "all concurrent callers must observe the same session"
        );
    }
    assert_eq!(registry.list_active().await, vec!["rec-contended".to_string()]);
}

#[tokio::test]
async fn remove_is_idempotent() {
    let registry = test_registry();
    registry.get_or_create("rec-1").await;

    assert!(registry.remove("rec-1").await.is_some());
    // Second removal is a no-op, not a failure
    assert!(registry.remove("rec-1").await.is_none());
    assert!(registry.remove("never-existed").await.is_none());
}

#[tokio::test]
async fn recreate_after_remove_starts_fresh_session() {
    let registry = test_registry();

    let original = registry.get_or_create("rec-1").await;
    {
        use meetscribe::{AudioFrame, FrameTimestamp};
        let mut buffer = original.buffer().await;
        buffer
            .append(&AudioFrame {
                samples: vec![5i16; 1_000],
                timestamp: FrameTimestamp {
                    relative: 0.0,
                    absolute: chrono::Utc::now(),
                },
            })
            .unwrap();
    }

    let removed = registry.remove("rec-1").await.unwrap();
    removed.finish().await;

    let fresh = registry.get_or_create("rec-1").await;
    assert!(!Arc::ptr_eq(&original, &fresh), "identity must not be reused");
    assert_eq!(fresh.buffer().await.sample_count(), 0, "fresh session starts empty");
}

#[tokio::test]
async fn list_active_tracks_live_sessions() {
    let registry = test_registry();

    assert!(registry.list_active().await.is_empty());

    registry.get_or_create("rec-a").await;
    registry.get_or_create("rec-b").await;

    let mut active = registry.list_active().await;
    active.sort();
    assert_eq!(active, vec!["rec-a".to_string(), "rec-b".to_string()]);

    registry.remove("rec-a").await;
    assert_eq!(registry.list_active().await, vec!["rec-b".to_string()]);
}

#[tokio::test]
async fn shutdown_drains_all_sessions() {
    let registry = test_registry();
    registry.get_or_create("rec-a").await;
    registry.get_or_create("rec-b").await;

    registry.shutdown().await;

    assert!(registry.list_active().await.is_empty());
}
