//! # konv-cache
//!
//! Storage layer: key-value stores and the channel repository built on them.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Stores**: `RedisStore` for production, `MemoryStore` for tests and local runs
//! - **Repository**: `KvChannelRepository`, channel persistence over any `KeyValueStore`
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use konv_cache::{KvChannelRepository, RedisPool, RedisPoolConfig, RedisStore};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let repo = KvChannelRepository::new(Arc::new(RedisStore::new(pool)));
//!
//! let channel = repo.create(&User::new("42"), "alerts").await?;
//! ```

pub mod pool;
pub mod repositories;
pub mod store;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export stores
pub use store::{MemoryStore, RedisStore};

// Re-export repositories
pub use repositories::{keys, KvChannelRepository};
