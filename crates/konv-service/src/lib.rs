//! # konv-service
//!
//! Application layer: the fan-out engine, the dispatch bus that decouples
//! ingestion from delivery, and the services behind the chat front end.

pub mod bus;
pub mod dto;
pub mod fanout;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bus::{DeliveryWorker, DispatchBus, MessageEvent};
pub use dto::{HealthChecks, HealthResponse, PublishRequest, ReadinessResponse};
pub use fanout::{with_channel, DeliveryReport, FanoutEngine, TargetOutcome, TargetReport};
pub use services::{
    BotReply, CallbackAction, CallbackReply, ChannelService, ConversationService, InboundMessage,
    InlineButton, Keyboard, MessageService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult,
};
