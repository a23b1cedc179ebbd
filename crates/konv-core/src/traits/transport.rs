//! Delivery transport port
//!
//! The fan-out engine hands each chunk to a transport sink. Failures are
//! returned as values so the engine can record them and move on.

use async_trait::async_trait;

use crate::error::TransportError;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one chunk of text to one target address
    async fn send_chunk(&self, target: &str, chunk: &str) -> TransportResult<()>;
}
