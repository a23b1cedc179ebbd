//! Fan-out engine
//!
//! Splits a message into chunks and hands them to the transport, target by
//! target, then counts the delivery once.

use std::sync::Arc;

use konv_core::{
    split_into_chunks, ChannelId, ChannelRepository, RepoResult, Transport, MAX_CHUNK_SIZE,
};
use tracing::{debug, instrument, warn};

use super::report::{DeliveryReport, TargetOutcome, TargetReport};

pub struct FanoutEngine {
    repo: Arc<dyn ChannelRepository>,
    transport: Arc<dyn Transport>,
    max_chunk_size: usize,
}

impl std::fmt::Debug for FanoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutEngine")
            .field("max_chunk_size", &self.max_chunk_size)
            .finish_non_exhaustive()
    }
}

impl FanoutEngine {
    pub fn new(repo: Arc<dyn ChannelRepository>, transport: Arc<dyn Transport>) -> Self {
        Self {
            repo,
            transport,
            max_chunk_size: MAX_CHUNK_SIZE,
        }
    }

    /// Override the chunk size (characters per chunk, at least 1)
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size.max(1);
        self
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Deliver `message` to every target of a channel.
    ///
    /// Targets are served in stored order and each target receives all of its
    /// chunks before the next one starts. A transport failure stops that
    /// target only. Once every target has been attempted the channel counter
    /// and the global counter are each incremented by one, whatever the
    /// per-target outcomes.
    ///
    /// # Errors
    ///
    /// `ChannelNotFound` when the channel does not exist, in which case
    /// nothing is sent or counted. Storage failures while loading or saving
    /// are returned as they occur.
    #[instrument(skip(self, message), fields(channel_id = %channel_id, chars = message.chars().count()))]
    pub async fn deliver(&self, channel_id: &ChannelId, message: &str) -> RepoResult<DeliveryReport> {
        let mut channel = self.repo.load(channel_id).await?;
        let chunks = split_into_chunks(message, self.max_chunk_size);

        let mut targets = Vec::with_capacity(channel.targets().len());
        for target in channel.targets() {
            let outcome = self.deliver_to_target(target, &chunks).await;
            targets.push(TargetReport {
                target: target.clone(),
                outcome,
            });
        }

        channel.increase_message_count();
        self.repo.save(&channel).await?;
        self.repo.increment_global_message_count().await?;

        let report = DeliveryReport {
            channel_id: channel.id,
            chunk_count: chunks.len(),
            message_count: channel.message_count,
            targets,
        };
        debug!(
            delivered = report.delivered_count(),
            failed = report.failed_count(),
            "Fan-out complete"
        );
        Ok(report)
    }

    async fn deliver_to_target(&self, target: &str, chunks: &[&str]) -> TargetOutcome {
        for (index, chunk) in chunks.iter().enumerate() {
            if let Err(e) = self.transport.send_chunk(target, chunk).await {
                warn!(
                    address = %target,
                    chunk = index,
                    error = %e,
                    "Chunk delivery failed, skipping target"
                );
                return TargetOutcome::Failed {
                    chunks_sent: index,
                    reason: e.reason,
                };
            }
        }
        TargetOutcome::Delivered {
            chunks: chunks.len(),
        }
    }
}
