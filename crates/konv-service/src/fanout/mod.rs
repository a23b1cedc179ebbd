//! Fan-out: delivering one message to every target of a channel.

mod engine;
mod report;
mod scope;

pub use engine::FanoutEngine;
pub use report::{DeliveryReport, TargetOutcome, TargetReport};
pub use scope::with_channel;
