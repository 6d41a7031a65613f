use super::segment::TranscriptSegment;
use tokio::sync::mpsc;
use tracing::info;

/// Output sink for transcript segments.
///
/// The emission mechanism is an external collaborator; production uses the log
/// sink, tests use a channel sink to observe emission order.
#[async_trait::async_trait]
pub trait TranscriptSink: Send + Sync {
    async fn emit(&self, segment: &TranscriptSegment);
}

/// Writes segments to the log and to stdout.
pub struct LogSink;

#[async_trait::async_trait]
impl TranscriptSink for LogSink {
    async fn emit(&self, segment: &TranscriptSegment) {
        info!(
            recording_id = %segment.recording_id,
            start = segment.start_time,
            end = segment.end_time,
            "transcript segment"
        );
        println!(
            "[{}] {:7.2}s - {:7.2}s  {}",
            segment.recording_id, segment.start_time, segment.end_time, segment.text
        );
    }
}

/// Forwards segments into an mpsc channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<TranscriptSegment>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TranscriptSegment>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl TranscriptSink for ChannelSink {
    async fn emit(&self, segment: &TranscriptSegment) {
        // Receiver dropped means nobody is listening; nothing to do.
        let _ = self.tx.send(segment.clone());
    }
}
