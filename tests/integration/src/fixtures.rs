//! Test fixtures and data generators

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique suffix for names and chat ids
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// JSON body of `POST /message`
#[derive(Debug, Serialize)]
pub struct PublishBody {
    pub target: String,
    pub message: String,
}

impl PublishBody {
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}

/// A channel name no other test uses
pub fn unique_channel_name() -> String {
    format!("channel{}", unique_suffix())
}

/// A chat id no other test uses
pub fn unique_chat_id() -> String {
    (100_000 + unique_suffix()).to_string()
}
