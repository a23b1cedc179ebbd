//! # konv-core
//!
//! Domain layer containing the channel entity, value objects, repository and
//! transport traits, and domain errors.
//! This crate has zero dependencies on infrastructure (Redis, Telegram, HTTP).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Channel, PendingInput, User};
pub use error::{DomainError, TransportError};
pub use traits::{
    ChannelRepository, KeyValueStore, RepoResult, Transport, TransportResult,
    OWNER_CHANNEL_LIST_LIMIT,
};
pub use value_objects::{split_into_chunks, ChannelId, ToggleOutcome, MAX_CHUNK_SIZE};
