//! Value objects - immutable types with validation

mod channel_id;
mod chunks;
mod toggle;

pub use channel_id::ChannelId;
pub use chunks::{split_into_chunks, MAX_CHUNK_SIZE};
pub use toggle::ToggleOutcome;
