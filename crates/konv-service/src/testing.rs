//! Test doubles shared by unit and integration tests.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use konv_core::{Transport, TransportError, TransportResult};
use parking_lot::Mutex;

/// One `send_chunk` call as seen by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentChunk {
    pub target: String,
    pub chunk: String,
}

/// Transport that records every call and fails for chosen targets
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentChunk>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `target` fail
    pub fn fail_target(&self, target: impl Into<String>) {
        self.failing.lock().insert(target.into());
    }

    /// Calls in the order they were made, failed ones included
    pub fn sent(&self) -> Vec<SentChunk> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// Poll until at least `count` calls were recorded or `timeout` elapses
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<SentChunk> {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.sent_count() < count && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_chunk(&self, target: &str, chunk: &str) -> TransportResult<()> {
        self.sent.lock().push(SentChunk {
            target: target.to_string(),
            chunk: chunk.to_string(),
        });
        if self.failing.lock().contains(target) {
            return Err(TransportError::new(target, "chat not found"));
        }
        Ok(())
    }
}
