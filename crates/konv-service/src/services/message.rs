//! Message ingestion
//!
//! Hands validated messages to the dispatch bus. Delivery happens later, on
//! the delivery worker; callers never wait for it.

use tracing::{info, instrument, warn};
use validator::Validate;

use crate::bus::MessageEvent;
use crate::dto::PublishRequest;

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Queue a message for fan-out.
    ///
    /// The channel id is not checked here; a message for an unknown channel
    /// is accepted and dropped by the worker.
    #[instrument(skip(self, request), fields(channel_id = %request.target, chars = request.message.chars().count()))]
    pub async fn publish(&self, request: PublishRequest) -> ServiceResult<()> {
        request.validate()?;

        let receivers = self
            .ctx
            .bus()
            .publish(MessageEvent::new(request.target, request.message));
        if receivers == 0 {
            warn!("No delivery worker running, message dropped");
        } else {
            info!("Message queued");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bus::DispatchBus;
    use crate::services::ServiceContextBuilder;
    use konv_cache::{KvChannelRepository, MemoryStore};
    use konv_core::ChannelId;

    fn ctx(bus: DispatchBus) -> crate::services::ServiceContext {
        let store = Arc::new(MemoryStore::new());
        ServiceContextBuilder::new()
            .store(store.clone())
            .channel_repo(Arc::new(KvChannelRepository::new(store)))
            .bus(bus)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_publish_reaches_bus() {
        let bus = DispatchBus::new(8);
        let mut rx = bus.subscribe();
        let ctx = ctx(bus);

        MessageService::new(&ctx)
            .publish(PublishRequest::new("c1", "hello"))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.channel_id, ChannelId::new("c1"));
        assert_eq!(event.message, "hello");
    }

    #[tokio::test]
    async fn test_publish_without_worker_succeeds() {
        let ctx = ctx(DispatchBus::new(8));
        MessageService::new(&ctx)
            .publish(PublishRequest::new("c1", "hello"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_publish_rejects_empty_target() {
        let ctx = ctx(DispatchBus::new(8));
        let err = MessageService::new(&ctx)
            .publish(PublishRequest::new("", "hello"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
