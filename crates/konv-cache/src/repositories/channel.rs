//! Key-value implementation of ChannelRepository

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use konv_core::{
    Channel, ChannelId, ChannelRepository, DomainError, KeyValueStore, PendingInput, RepoResult,
    User, OWNER_CHANNEL_LIST_LIMIT,
};

use super::keys;

/// ChannelRepository over any `KeyValueStore`
#[derive(Clone)]
pub struct KvChannelRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvChannelRepository {
    /// Create a new KvChannelRepository
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Load a channel, treating a missing one as `None`
    async fn find(&self, id: &ChannelId) -> RepoResult<Option<Channel>> {
        match self.load(id).await {
            Ok(channel) => Ok(Some(channel)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn owner_channel_ids(&self, owner: &User, stop: isize) -> RepoResult<Vec<ChannelId>> {
        let ids = self
            .store
            .list_range(&keys::user_channels(&owner.id), 0, stop)
            .await?;
        Ok(ids.into_iter().map(ChannelId::from).collect())
    }
}

fn parse_counter(raw: Option<&String>, id: &ChannelId) -> u64 {
    match raw {
        None => 0,
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(channel_id = %id, value = %value, "Corrupt message counter, reading as zero");
            0
        }),
    }
}

#[async_trait]
impl ChannelRepository for KvChannelRepository {
    #[instrument(skip(self), fields(owner = %owner))]
    async fn create(&self, owner: &User, name: &str) -> RepoResult<Channel> {
        // Uniqueness is checked over the full owner list, not the listing window
        let owned = self.owner_channel_ids(owner, -1).await?;
        for id in &owned {
            if let Some(existing) = self.find(id).await? {
                if existing.name == name {
                    return Err(DomainError::DuplicateChannelName {
                        name: name.to_string(),
                    });
                }
            }
        }

        let channel = Channel::create(name);
        self.save(&channel).await?;
        self.store
            .list_push_front(&keys::user_channels(&owner.id), channel.id.as_str())
            .await?;

        debug!(channel_id = %channel.id, "Channel created");
        Ok(channel)
    }

    #[instrument(skip(self))]
    async fn load(&self, id: &ChannelId) -> RepoResult<Channel> {
        let fields = self.store.hash_get_all(&keys::channel(id)).await?;
        if fields.is_empty() {
            return Err(DomainError::ChannelNotFound(id.clone()));
        }

        let name = fields.get(keys::FIELD_NAME).cloned().unwrap_or_default();
        let message_count = parse_counter(fields.get(keys::FIELD_MESSAGE_COUNT), id);
        let targets = self
            .store
            .list_range(&keys::channel_targets(id), 0, -1)
            .await?;

        Ok(Channel::restore(id.clone(), name, message_count, targets))
    }

    #[instrument(skip(self), fields(owner = %owner))]
    async fn list_for_owner(&self, owner: &User) -> RepoResult<Vec<Channel>> {
        let limit = OWNER_CHANNEL_LIST_LIMIT as isize;
        let ids = self.owner_channel_ids(owner, limit - 1).await?;

        if ids.len() == OWNER_CHANNEL_LIST_LIMIT {
            let total = self
                .store
                .list_len(&keys::user_channels(&owner.id))
                .await?;
            if total > OWNER_CHANNEL_LIST_LIMIT {
                warn!(
                    total,
                    limit = OWNER_CHANNEL_LIST_LIMIT,
                    "Owner channel list truncated"
                );
            }
        }

        let mut channels = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.find(id).await? {
                Some(channel) => channels.push(channel),
                None => warn!(channel_id = %id, "Owner list references a missing channel"),
            }
        }
        Ok(channels)
    }

    #[instrument(skip(self), fields(owner = %owner))]
    async fn owns(&self, owner: &User, id: &ChannelId) -> RepoResult<bool> {
        let owned = self.owner_channel_ids(owner, -1).await?;
        Ok(owned.contains(id))
    }

    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    async fn save(&self, channel: &Channel) -> RepoResult<()> {
        let count = channel.message_count.to_string();
        self.store
            .hash_set(
                &keys::channel(&channel.id),
                &[
                    (keys::FIELD_NAME, channel.name.as_str()),
                    (keys::FIELD_MESSAGE_COUNT, count.as_str()),
                ],
            )
            .await?;

        let targets_key = keys::channel_targets(&channel.id);
        self.store.delete(&targets_key).await?;
        for target in channel.targets() {
            self.store.list_push_back(&targets_key, target).await?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(owner = %owner))]
    async fn delete(&self, owner: &User, id: &ChannelId) -> RepoResult<()> {
        let unlinked = self
            .store
            .list_remove(&keys::user_channels(&owner.id), id.as_str())
            .await?;
        self.store.delete(&keys::channel(id)).await?;
        self.store.delete(&keys::channel_targets(id)).await?;

        debug!(unlinked, "Channel deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_pending_input(
        &self,
        conversation_id: &str,
        marker: PendingInput,
    ) -> RepoResult<()> {
        self.store
            .set(&keys::pending_input(conversation_id), marker.as_str())
            .await
    }

    #[instrument(skip(self))]
    async fn take_pending_input(&self, conversation_id: &str) -> RepoResult<Option<PendingInput>> {
        let Some(raw) = self
            .store
            .take(&keys::pending_input(conversation_id))
            .await?
        else {
            return Ok(None);
        };

        match raw.parse::<PendingInput>() {
            Ok(marker) => Ok(Some(marker)),
            Err(_) => {
                warn!(marker = %raw, "Ignoring unknown pending-input marker");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    async fn increment_global_message_count(&self) -> RepoResult<u64> {
        let total = self.store.incr(keys::GLOBAL_MESSAGE_COUNT).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    #[instrument(skip(self))]
    async fn global_message_count(&self) -> RepoResult<u64> {
        let raw = self.store.get(keys::GLOBAL_MESSAGE_COUNT).await?;
        Ok(raw.and_then(|value| value.parse().ok()).unwrap_or(0))
    }
}
