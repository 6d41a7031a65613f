//! Process-wide map of live sessions.
//!
//! The registry is the one resource mutated by multiple concurrent
//! connections; get/create/remove all go through a single write-locked map so
//! a session is created exactly once and removal is the linearization point
//! for teardown. A removed id is gone for good; a later `get_or_create` with
//! the same id starts a fresh session, never reuses identity.

use super::buffer::{SessionBuffer, Window};
use super::config::SessionConfig;
use crate::transcribe::{TranscriptSegment, TranscriptionWorker};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Sender half of a session's window queue.
///
/// Bounded capacity 1 implements the backpressure mode: the ingest loop waits
/// while the previous window is still queued. Unbounded never waits.
enum WindowSender {
    Bounded(mpsc::Sender<Window>),
    Unbounded(mpsc::UnboundedSender<Window>),
}

impl WindowSender {
    async fn send(&self, window: Window) {
        match self {
            WindowSender::Bounded(tx) => {
                let _ = tx.send(window).await;
            }
            WindowSender::Unbounded(tx) => {
                let _ = tx.send(window);
            }
        }
    }
}

enum WindowReceiver {
    Bounded(mpsc::Receiver<Window>),
    Unbounded(mpsc::UnboundedReceiver<Window>),
}

impl WindowReceiver {
    async fn recv(&mut self) -> Option<Window> {
        match self {
            WindowReceiver::Bounded(rx) => rx.recv().await,
            WindowReceiver::Unbounded(rx) => rx.recv().await,
        }
    }
}

/// One live recording: its sample buffer, its window queue, and the task that
/// drains the queue through the transcription worker.
///
/// The queue gives each session a single consumer, so transcript segments for
/// a recording are emitted in window order even when the global worker pool
/// runs windows from many sessions concurrently.
pub struct SessionHandle {
    recording_id: String,
    buffer: Mutex<SessionBuffer>,
    windows: Mutex<Option<WindowSender>>,
    worker_task: Mutex<Option<JoinHandle<()>>>,
    transcript: Arc<Mutex<Vec<TranscriptSegment>>>,
}

impl SessionHandle {
    fn new(
        recording_id: String,
        config: &SessionConfig,
        worker: Arc<TranscriptionWorker>,
    ) -> Arc<Self> {
        let (tx, mut rx) = if config.backpressure {
            let (tx, rx) = mpsc::channel(1);
            (WindowSender::Bounded(tx), WindowReceiver::Bounded(rx))
        } else {
            let (tx, rx) = mpsc::unbounded_channel();
            (WindowSender::Unbounded(tx), WindowReceiver::Unbounded(rx))
        };

        let transcript = Arc::new(Mutex::new(Vec::new()));

        let task = {
            let recording_id = recording_id.clone();
            let transcript = Arc::clone(&transcript);
            tokio::spawn(async move {
                while let Some(window) = rx.recv().await {
                    let segments = worker.process(&recording_id, window).await;
                    if !segments.is_empty() {
                        transcript.lock().await.extend(segments);
                    }
                }
                debug!(recording_id = %recording_id, "session worker finished");
            })
        };

        let buffer = SessionBuffer::new(recording_id.clone(), config.sample_rate);

        Arc::new(Self {
            recording_id,
            buffer: Mutex::new(buffer),
            windows: Mutex::new(Some(tx)),
            worker_task: Mutex::new(Some(task)),
            transcript,
        })
    }

    pub fn recording_id(&self) -> &str {
        &self.recording_id
    }

    /// Exclusive access to the sample buffer.
    pub async fn buffer(&self) -> tokio::sync::MutexGuard<'_, SessionBuffer> {
        self.buffer.lock().await
    }

    /// Queue a window for this session's transcription task. In backpressure
    /// mode this waits until the queue has room.
    pub async fn dispatch(&self, window: Window) {
        let sender = self.windows.lock().await;
        if let Some(tx) = sender.as_ref() {
            tx.send(window).await;
        }
    }

    /// Transcript segments emitted so far for this session.
    pub async fn transcript(&self) -> Vec<TranscriptSegment> {
        self.transcript.lock().await.clone()
    }

    /// Flush the un-transcribed tail, close the window queue, and wait for the
    /// session task to drain. The registry's `remove` guarantees only one
    /// caller gets the detached handle.
    pub async fn finish(&self) {
        let tail = self.buffer.lock().await.flush_remainder();
        if let Some(window) = tail {
            info!(
                recording_id = %self.recording_id,
                samples = window.samples.len(),
                "flushing final partial window"
            );
            self.dispatch(window).await;
        }

        // Dropping the sender closes the queue; the task exits once the final
        // window has been processed.
        self.windows.lock().await.take();

        let task = self.worker_task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!(recording_id = %self.recording_id, "session worker panicked: {}", e);
            }
        }
    }
}

/// Registry of live sessions, keyed by recording id.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
    config: SessionConfig,
    worker: Arc<TranscriptionWorker>,
}

impl SessionRegistry {
    pub fn new(config: SessionConfig, worker: Arc<TranscriptionWorker>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            worker,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Return the existing session for `recording_id` or atomically create a
    /// new empty one.
    pub async fn get_or_create(&self, recording_id: &str) -> Arc<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(recording_id) {
            return Arc::clone(existing);
        }

        info!(recording_id = %recording_id, "creating session");
        let handle =
            SessionHandle::new(recording_id.to_string(), &self.config, Arc::clone(&self.worker));
        sessions.insert(recording_id.to_string(), Arc::clone(&handle));
        handle
    }

    /// Look up a live session without creating one.
    pub async fn get(&self, recording_id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.read().await.get(recording_id).cloned()
    }

    /// Detach the session for final flush. Idempotent: a second caller (a
    /// close racing the shutdown sweep) gets `None` and treats it as a no-op.
    pub async fn remove(&self, recording_id: &str) -> Option<Arc<SessionHandle>> {
        let removed = self.sessions.write().await.remove(recording_id);
        if removed.is_some() {
            info!(recording_id = %recording_id, "session removed");
        }
        removed
    }

    /// Recording ids of all live sessions.
    pub async fn list_active(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    /// Flush and tear down every live session. Called on process shutdown.
    pub async fn shutdown(&self) {
        let drained: Vec<Arc<SessionHandle>> = {
            let mut sessions = self.sessions.write().await;
            sessions.drain().map(|(_, handle)| handle).collect()
        };

        for handle in drained {
            handle.finish().await;
        }
    }
}
