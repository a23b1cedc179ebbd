//! Pending-input marker
//!
//! Records what a conversation's next message is expected to mean. Set before
//! prompting, read-and-cleared on the next inbound message.

use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// What the next message in a conversation should be interpreted as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingInput {
    /// The next message is the name of a channel to create
    ChannelName,
}

impl PendingInput {
    /// Persisted marker string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChannelName => "channelname",
        }
    }
}

impl fmt::Display for PendingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PendingInput {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "channelname" => Ok(Self::ChannelName),
            other => Err(DomainError::ValidationError(format!(
                "unknown pending input marker: {other}"
            ))),
        }
    }
}
