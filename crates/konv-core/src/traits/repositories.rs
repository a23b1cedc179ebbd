//! Repository traits (ports) - define the interface for channel persistence
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation on top of a `KeyValueStore`.

use async_trait::async_trait;

use crate::entities::{Channel, PendingInput, User};
use crate::error::DomainError;
use crate::value_objects::ChannelId;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Maximum number of channels returned by `list_for_owner`.
///
/// Owners with more channels get the newest ones; the repository logs a
/// warning whenever the list is truncated.
pub const OWNER_CHANNEL_LIST_LIMIT: usize = 100;

// ============================================================================
// Channel Repository
// ============================================================================

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Create a channel owned by `owner`.
    ///
    /// Fails with `DuplicateChannelName` if the owner already has a channel
    /// with exactly this name.
    async fn create(&self, owner: &User, name: &str) -> RepoResult<Channel>;

    /// Load a channel, failing with `ChannelNotFound` if it does not exist
    async fn load(&self, id: &ChannelId) -> RepoResult<Channel>;

    /// List an owner's channels, most recently created first, bounded by
    /// `OWNER_CHANNEL_LIST_LIMIT`
    async fn list_for_owner(&self, owner: &User) -> RepoResult<Vec<Channel>>;

    /// Whether `id` is in the owner's channel list (the full list, not the
    /// bounded listing)
    async fn owns(&self, owner: &User, id: &ChannelId) -> RepoResult<bool>;

    /// Overwrite the persisted name, counter and target list.
    ///
    /// The target list is replaced destructively; concurrent saves of the same
    /// channel race and the last writer wins.
    async fn save(&self, channel: &Channel) -> RepoResult<()>;

    /// Remove a channel and its targets, and unlink it from the owner.
    /// Deleting an already deleted channel is a no-op.
    async fn delete(&self, owner: &User, id: &ChannelId) -> RepoResult<()>;

    /// Record what the next message in a conversation means
    async fn set_pending_input(&self, conversation_id: &str, marker: PendingInput)
        -> RepoResult<()>;

    /// Read and clear the pending-input marker of a conversation
    async fn take_pending_input(&self, conversation_id: &str) -> RepoResult<Option<PendingInput>>;

    /// Count one delivered message across all channels, returning the new total
    async fn increment_global_message_count(&self) -> RepoResult<u64>;

    /// Total delivered messages across all channels (zero when unset)
    async fn global_message_count(&self) -> RepoResult<u64>;
}
