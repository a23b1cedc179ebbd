//! Request DTOs

use serde::Deserialize;
use validator::Validate;

/// Message submitted for fan-out.
///
/// `target` is the channel id. An empty `message` is accepted and delivered
/// as a single empty chunk.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PublishRequest {
    #[validate(length(min = 1, max = 128, message = "target must be 1-128 characters"))]
    pub target: String,

    pub message: String,
}

impl PublishRequest {
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}
