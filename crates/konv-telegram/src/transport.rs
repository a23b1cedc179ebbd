//! Transport sink backed by the Bot API `sendMessage` call.

use std::time::Duration;

use async_trait::async_trait;
use konv_core::{Transport, TransportError, TransportResult};
use teloxide::{
    prelude::*,
    types::{ChatId, Recipient},
    RequestError,
};
use tracing::warn;

/// Retries allowed when Telegram answers "retry after"
const RETRY_AFTER_MAX_RETRIES: usize = 2;

/// Longest "retry after" wait honoured before giving up on a chunk
const RETRY_AFTER_MAX_WAIT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Numeric targets are chat ids; anything else is a public `@channel` name.
pub fn recipient(target: &str) -> Recipient {
    match target.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(target.to_string()),
    }
}

fn retry_after_duration(error: &RequestError) -> Option<Duration> {
    match error {
        RequestError::RetryAfter(wait) => Some(wait.duration()),
        _ => None,
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_chunk(&self, target: &str, chunk: &str) -> TransportResult<()> {
        let mut retries = 0usize;
        loop {
            match self.bot.send_message(recipient(target), chunk).await {
                Ok(_) => return Ok(()),
                Err(err) => {
                    let wait = match retry_after_duration(&err) {
                        Some(wait)
                            if retries < RETRY_AFTER_MAX_RETRIES && wait <= RETRY_AFTER_MAX_WAIT =>
                        {
                            wait
                        }
                        _ => return Err(TransportError::new(target, err)),
                    };
                    retries += 1;
                    warn!(
                        address = %target,
                        retries,
                        retry_after_secs = wait.as_secs(),
                        "Telegram rate limited, waiting before retry"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}
