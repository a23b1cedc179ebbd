//! In-process dispatch bus
//!
//! Producers publish `MessageEvent`s without waiting; the `DeliveryWorker`
//! consumes them and runs the fan-out.

mod dispatch_bus;
mod worker;

pub use dispatch_bus::{DispatchBus, MessageEvent};
pub use worker::DeliveryWorker;
