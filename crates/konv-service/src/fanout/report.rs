//! Per-target delivery outcomes.

use konv_core::ChannelId;
use serde::Serialize;

/// What happened to one target during a fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetOutcome {
    /// Every chunk was accepted by the transport
    Delivered { chunks: usize },
    /// The transport rejected a chunk; later chunks for this target were skipped
    Failed { chunks_sent: usize, reason: String },
}

impl TargetOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub target: String,
    #[serde(flatten)]
    pub outcome: TargetOutcome,
}

/// Result of one `deliver` call.
///
/// A report is produced whenever the channel existed, even if every target
/// failed; the message counter has been incremented in that case too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub channel_id: ChannelId,
    pub chunk_count: usize,
    /// Channel message counter after this delivery
    pub message_count: u64,
    pub targets: Vec<TargetReport>,
}

impl DeliveryReport {
    pub fn delivered_count(&self) -> usize {
        self.targets.iter().filter(|t| t.outcome.is_delivered()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.targets.len() - self.delivered_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets.iter().filter(|t| !t.outcome.is_delivered())
    }
}
