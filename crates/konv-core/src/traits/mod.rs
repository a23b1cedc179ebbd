//! Traits (ports) implemented by the infrastructure layer

mod repositories;
mod store;
mod transport;

pub use repositories::{ChannelRepository, RepoResult, OWNER_CHANNEL_LIST_LIMIT};
pub use store::KeyValueStore;
pub use transport::{Transport, TransportResult};
