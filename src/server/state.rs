use crate::session::SessionRegistry;
use crate::store::ChunkStore;
use std::sync::Arc;

/// Shared application state for the ingest endpoint and HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live sessions, keyed by recording id
    pub registry: Arc<SessionRegistry>,

    /// Durable copy of every received chunk
    pub store: Arc<dyn ChunkStore>,
}

impl AppState {
    pub fn new(registry: Arc<SessionRegistry>, store: Arc<dyn ChunkStore>) -> Self {
        Self { registry, store }
    }
}
