//! Subscription toggle outcome

use serde::{Deserialize, Serialize};

/// Result of flipping a target's subscription to a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    /// The target was not subscribed and has been added
    Added,
    /// The target was subscribed and has been removed
    Removed,
}
