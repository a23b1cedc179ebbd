//! Integration test utilities for konvbot
//!
//! Runs the HTTP endpoint in-process against the in-memory store and a
//! recording transport, so no Redis or Telegram is needed.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
