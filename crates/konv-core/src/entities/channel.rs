//! Channel entity - a named, user-owned fan-out destination

use crate::value_objects::{ChannelId, ToggleOutcome};

/// Channel entity
///
/// Holds the ordered set of delivery targets (chat ids) subscribed to the
/// channel. The entity knows nothing about persistence; every mutation must be
/// followed by an explicit repository save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub message_count: u64,
    targets: Vec<String>,
}

impl Channel {
    /// Create a new channel with a freshly generated id
    #[must_use]
    pub fn create(name: impl Into<String>) -> Self {
        Self::new(ChannelId::generate(), name)
    }

    /// Create a channel with a known id and no targets
    #[must_use]
    pub fn new(id: ChannelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            message_count: 0,
            targets: Vec::new(),
        }
    }

    /// Rebuild a channel from persisted state, dropping duplicate targets
    #[must_use]
    pub fn restore(
        id: ChannelId,
        name: impl Into<String>,
        message_count: u64,
        targets: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut channel = Self::new(id, name);
        channel.message_count = message_count;
        for target in targets {
            channel.add_target(target);
        }
        channel
    }

    /// Subscribed targets in stored order
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Check whether `target` is subscribed
    #[must_use]
    pub fn has_target(&self, target: &str) -> bool {
        self.targets.iter().any(|t| t == target)
    }

    /// Subscribe a target. Returns `false` if it was already present.
    pub fn add_target(&mut self, target: impl Into<String>) -> bool {
        let target = target.into();
        if self.has_target(&target) {
            return false;
        }
        self.targets.push(target);
        true
    }

    /// Unsubscribe a target. Returns `false` if it was not present.
    pub fn remove_target(&mut self, target: &str) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t != target);
        self.targets.len() != before
    }

    /// Flip the subscription of `target`: remove it if present, add it otherwise
    pub fn toggle_target(&mut self, target: &str) -> ToggleOutcome {
        if self.remove_target(target) {
            ToggleOutcome::Removed
        } else {
            self.targets.push(target.to_string());
            ToggleOutcome::Added
        }
    }

    /// Record one fan-out
    pub fn increase_message_count(&mut self) {
        self.message_count = self.message_count.saturating_add(1);
    }
}
