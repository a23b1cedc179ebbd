//! Persisted key layout.
//!
//! Key names are part of the storage format; renaming any of them orphans
//! existing data.

use konv_core::ChannelId;

pub const KEY_PREFIX: &str = "konvbot";

/// Global delivered-message counter (scalar)
pub const GLOBAL_MESSAGE_COUNT: &str = "konvbot.common.messagecount";

/// Hash field holding a channel's display name
pub const FIELD_NAME: &str = "name";

/// Hash field holding a channel's delivered-message counter
pub const FIELD_MESSAGE_COUNT: &str = "messagecount";

/// Channel attributes (hash: `name`, `messagecount`)
pub fn channel(id: &ChannelId) -> String {
    format!("{KEY_PREFIX}.channel.{id}")
}

/// Ordered list of a channel's targets
pub fn channel_targets(id: &ChannelId) -> String {
    format!("{KEY_PREFIX}.channeltarget.{id}")
}

/// Channel ids owned by a user, newest first
pub fn user_channels(user_id: &str) -> String {
    format!("{KEY_PREFIX}.user.{user_id}.channellist")
}

/// Pending-input marker of a conversation
pub fn pending_input(conversation_id: &str) -> String {
    format!("{KEY_PREFIX}.chat.{conversation_id}.waitfor")
}
