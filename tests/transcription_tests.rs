// Integration tests for the transcription worker
//
// The worker re-bases engine timestamps onto the session timeline and must
// isolate failures per window: a broken window is skipped and logged, never
// escalated to the session.

use meetscribe::{ChannelSink, MockEngine, TranscriptionWorker, Window};
use std::sync::Arc;

#[tokio::test]
async fn rebases_segment_times_to_session_timeline() {
    let (sink, mut rx) = ChannelSink::new();
    let worker = TranscriptionWorker::new(
        Arc::new(MockEngine::new().with_response("hello world")),
        Arc::new(sink),
        2,
        16_000,
    );

    // Window starting 2 seconds into the recording
    let window = Window {
        samples: vec![500i16; 16_000],
        start_offset: 32_000,
    };

    let segments = worker.process("rec-1", window).await;
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].recording_id, "rec-1");
    assert_eq!(segments[0].text, "hello world");
    assert!((segments[0].start_time - 2.0).abs() < 1e-9);
    assert!((segments[0].end_time - 3.0).abs() < 1e-9);

    let emitted = rx.recv().await.unwrap();
    assert_eq!(emitted.text, "hello world");
}

#[tokio::test]
async fn empty_window_produces_no_segments() {
    let (sink, mut rx) = ChannelSink::new();
    let worker = TranscriptionWorker::new(
        Arc::new(MockEngine::new()),
        Arc::new(sink),
        2,
        16_000,
    );

    let segments = worker
        .process(
            "rec-1",
            Window {
                samples: Vec::new(),
                start_offset: 0,
            },
        )
        .await;

    assert!(segments.is_empty());
    assert!(rx.try_recv().is_err(), "nothing should be emitted");
}

#[tokio::test]
async fn engine_failure_skips_window_and_continues() {
    let (sink, mut rx) = ChannelSink::new();
    let worker = TranscriptionWorker::new(
        Arc::new(MockEngine::new().with_failure()),
        Arc::new(sink),
        2,
        16_000,
    );

    let segments = worker
        .process(
            "rec-1",
            Window {
                samples: vec![100i16; 16_000],
                start_offset: 0,
            },
        )
        .await;

    // The failed window yields nothing and does not panic or poison anything
    assert!(segments.is_empty());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn failure_on_one_window_does_not_affect_the_next() {
    // Same worker shape the pipeline uses: the failing engine is per-call,
    // so a healthy engine processing the next window is unaffected. Here we
    // verify the worker itself carries no state across a failure.
    let (sink, _rx) = ChannelSink::new();
    let worker = TranscriptionWorker::new(
        Arc::new(MockEngine::new().with_failure()),
        Arc::new(sink),
        2,
        16_000,
    );

    for _ in 0..3 {
        let segments = worker
            .process(
                "rec-1",
                Window {
                    samples: vec![100i16; 8_000],
                    start_offset: 0,
                },
            )
            .await;
        assert!(segments.is_empty());
    }
}
