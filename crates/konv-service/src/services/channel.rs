//! Channel service
//!
//! Channel management on behalf of an owner. Every mutation that needs an
//! owner checks the owner's channel list first; channels owned by someone
//! else are reported as not found.

use konv_core::{Channel, ChannelId, DomainError, ToggleOutcome, User};
use tracing::{debug, info, instrument};

use crate::fanout::with_channel;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Longest accepted channel name, in characters
pub const MAX_CHANNEL_NAME_CHARS: usize = 64;

/// Channel service
pub struct ChannelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChannelService<'a> {
    /// Create a new ChannelService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a channel. Surrounding whitespace is not part of the name.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn create_channel(&self, owner: &User, name: &str) -> ServiceResult<Channel> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Channel name must not be empty"));
        }
        if name.chars().count() > MAX_CHANNEL_NAME_CHARS {
            return Err(ServiceError::validation(format!(
                "Channel name must be at most {MAX_CHANNEL_NAME_CHARS} characters"
            )));
        }

        let channel = self.ctx.channel_repo().create(owner, name).await?;
        info!(channel_id = %channel.id, "Channel created");
        Ok(channel)
    }

    /// The owner's channels, newest first
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn list_channels(&self, owner: &User) -> ServiceResult<Vec<Channel>> {
        Ok(self.ctx.channel_repo().list_for_owner(owner).await?)
    }

    /// Load a channel regardless of owner
    #[instrument(skip(self))]
    pub async fn get_channel(&self, id: &ChannelId) -> ServiceResult<Channel> {
        Ok(self.ctx.channel_repo().load(id).await?)
    }

    /// Load a channel the owner owns
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn get_owned_channel(&self, owner: &User, id: &ChannelId) -> ServiceResult<Channel> {
        self.require_owner(owner, id).await?;
        self.get_channel(id).await
    }

    /// Delete one of the owner's channels.
    ///
    /// Returns `false` when there was nothing to delete, which includes a
    /// second delete of the same channel and channels owned by someone else.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn delete_channel(&self, owner: &User, id: &ChannelId) -> ServiceResult<bool> {
        if !self.ctx.channel_repo().owns(owner, id).await? {
            debug!("Channel not in owner list, nothing to delete");
            return Ok(false);
        }
        self.ctx.channel_repo().delete(owner, id).await?;
        info!(channel_id = %id, "Channel deleted");
        Ok(true)
    }

    /// Flip `target`'s subscription to one of the owner's channels
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn toggle_target(
        &self,
        owner: &User,
        id: &ChannelId,
        target: &str,
    ) -> ServiceResult<ToggleOutcome> {
        self.require_owner(owner, id).await?;
        let (_, outcome) =
            with_channel(self.ctx.channel_repo(), id, |channel| channel.toggle_target(target))
                .await?;
        info!(channel_id = %id, address = %target, ?outcome, "Target toggled");
        Ok(outcome)
    }

    /// Subscribe `target` to a channel; a no-op if it already is
    #[instrument(skip(self))]
    pub async fn add_target(&self, id: &ChannelId, target: &str) -> ServiceResult<bool> {
        let (_, added) =
            with_channel(self.ctx.channel_repo(), id, |channel| channel.add_target(target))
                .await?;
        Ok(added)
    }

    /// Total messages delivered across all channels
    #[instrument(skip(self))]
    pub async fn global_message_count(&self) -> ServiceResult<u64> {
        Ok(self.ctx.channel_repo().global_message_count().await?)
    }

    async fn require_owner(&self, owner: &User, id: &ChannelId) -> ServiceResult<()> {
        if self.ctx.channel_repo().owns(owner, id).await? {
            Ok(())
        } else {
            Err(DomainError::ChannelNotFound(id.clone()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bus::DispatchBus;
    use crate::services::ServiceContextBuilder;
    use konv_cache::{KvChannelRepository, MemoryStore};

    fn ctx() -> ServiceContext {
        let store = Arc::new(MemoryStore::new());
        ServiceContextBuilder::new()
            .store(store.clone())
            .channel_repo(Arc::new(KvChannelRepository::new(store)))
            .bus(DispatchBus::new(8))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_trims_and_validates() {
        let ctx = ctx();
        let service = ChannelService::new(&ctx);
        let owner = User::new("u1");

        let channel = service.create_channel(&owner, "  alerts \n").await.unwrap();
        assert_eq!(channel.name, "alerts");

        assert_eq!(
            service.create_channel(&owner, "   ").await.unwrap_err().status_code(),
            400
        );
        let long = "x".repeat(MAX_CHANNEL_NAME_CHARS + 1);
        assert_eq!(
            service.create_channel(&owner, &long).await.unwrap_err().status_code(),
            400
        );
    }

    #[tokio::test]
    async fn test_duplicate_name_per_owner() {
        let ctx = ctx();
        let service = ChannelService::new(&ctx);

        service.create_channel(&User::new("u1"), "X").await.unwrap();
        let err = service.create_channel(&User::new("u1"), "X").await.unwrap_err();
        assert_eq!(err.status_code(), 409);

        service.create_channel(&User::new("u2"), "X").await.unwrap();
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_membership() {
        let ctx = ctx();
        let service = ChannelService::new(&ctx);
        let owner = User::new("u1");
        let channel = service.create_channel(&owner, "alerts").await.unwrap();

        let first = service.toggle_target(&owner, &channel.id, "chat42").await.unwrap();
        assert_eq!(first, ToggleOutcome::Added);
        assert!(service.get_channel(&channel.id).await.unwrap().has_target("chat42"));

        let second = service.toggle_target(&owner, &channel.id, "chat42").await.unwrap();
        assert_eq!(second, ToggleOutcome::Removed);
        assert!(service.get_channel(&channel.id).await.unwrap().targets().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_requires_ownership() {
        let ctx = ctx();
        let service = ChannelService::new(&ctx);
        let channel = service.create_channel(&User::new("u1"), "alerts").await.unwrap();

        let err = service
            .toggle_target(&User::new("intruder"), &channel.id, "chat9")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(service.get_channel(&channel.id).await.unwrap().targets().is_empty());
    }

    #[tokio::test]
    async fn test_delete_twice_is_noop() {
        let ctx = ctx();
        let service = ChannelService::new(&ctx);
        let owner = User::new("u1");
        let channel = service.create_channel(&owner, "alerts").await.unwrap();

        assert!(service.delete_channel(&owner, &channel.id).await.unwrap());
        assert!(!service.delete_channel(&owner, &channel.id).await.unwrap());
        assert!(service.get_channel(&channel.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_by_other_user_keeps_channel() {
        let ctx = ctx();
        let service = ChannelService::new(&ctx);
        let channel = service.create_channel(&User::new("u1"), "alerts").await.unwrap();

        assert!(!service
            .delete_channel(&User::new("u2"), &channel.id)
            .await
            .unwrap());
        assert!(service.get_channel(&channel.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_add_target_is_idempotent() {
        let ctx = ctx();
        let service = ChannelService::new(&ctx);
        let channel = service.create_channel(&User::new("u1"), "alerts").await.unwrap();

        assert!(service.add_target(&channel.id, "chat42").await.unwrap());
        assert!(!service.add_target(&channel.id, "chat42").await.unwrap());
        assert_eq!(
            service.get_channel(&channel.id).await.unwrap().targets(),
            ["chat42"]
        );
    }
}
