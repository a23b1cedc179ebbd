//! Service context - dependency container for services

use std::sync::Arc;

use konv_core::{ChannelRepository, KeyValueStore};

use crate::bus::DispatchBus;

use super::error::{ServiceError, ServiceResult};

/// Everything the services need, cloned cheaply into handlers.
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn KeyValueStore>,
    channel_repo: Arc<dyn ChannelRepository>,
    bus: DispatchBus,
    /// Base URL of the HTTP ingestion endpoint, used in usage hints
    public_base_url: String,
    bot_name: String,
}

impl ServiceContext {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        channel_repo: Arc<dyn ChannelRepository>,
        bus: DispatchBus,
        public_base_url: impl Into<String>,
        bot_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            channel_repo,
            bus,
            public_base_url: public_base_url.into(),
            bot_name: bot_name.into(),
        }
    }

    /// Get the underlying key-value store
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Get the channel repository
    pub fn channel_repo(&self) -> &dyn ChannelRepository {
        self.channel_repo.as_ref()
    }

    /// Get the dispatch bus
    pub fn bus(&self) -> &DispatchBus {
        &self.bus
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("bus", &self.bus)
            .field("public_base_url", &self.public_base_url)
            .field("bot_name", &self.bot_name)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    store: Option<Arc<dyn KeyValueStore>>,
    channel_repo: Option<Arc<dyn ChannelRepository>>,
    bus: Option<DispatchBus>,
    public_base_url: Option<String>,
    bot_name: Option<String>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn channel_repo(mut self, repo: Arc<dyn ChannelRepository>) -> Self {
        self.channel_repo = Some(repo);
        self
    }

    pub fn bus(mut self, bus: DispatchBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    pub fn bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = Some(name.into());
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the store, repository or bus is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.store
                .ok_or_else(|| ServiceError::validation("store is required"))?,
            self.channel_repo
                .ok_or_else(|| ServiceError::validation("channel_repo is required"))?,
            self.bus
                .ok_or_else(|| ServiceError::validation("bus is required"))?,
            self.public_base_url
                .unwrap_or_else(|| "http://localhost:8000".to_string()),
            self.bot_name.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use konv_cache::{KvChannelRepository, MemoryStore};

    #[test]
    fn test_builder_requires_dependencies() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_builder_defaults() {
        let store = Arc::new(MemoryStore::new());
        let ctx = ServiceContextBuilder::new()
            .store(store.clone())
            .channel_repo(Arc::new(KvChannelRepository::new(store)))
            .bus(DispatchBus::new(4))
            .build()
            .unwrap();

        assert_eq!(ctx.public_base_url(), "http://localhost:8000");
        assert_eq!(ctx.bot_name(), "");
    }
}
