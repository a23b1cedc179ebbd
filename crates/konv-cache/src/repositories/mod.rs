//! Repository implementations over a `KeyValueStore`.

mod channel;
pub mod keys;

pub use channel::KvChannelRepository;
