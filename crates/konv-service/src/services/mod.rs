//! Business logic services

pub mod channel;
pub mod context;
pub mod conversation;
pub mod error;
pub mod message;
pub mod reply;

pub use channel::{ChannelService, MAX_CHANNEL_NAME_CHARS};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use conversation::{ConversationService, InboundMessage};
pub use error::{ServiceError, ServiceResult};
pub use message::MessageService;
pub use reply::{BotReply, CallbackAction, CallbackReply, InlineButton, Keyboard};
