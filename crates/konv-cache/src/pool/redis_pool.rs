//! deadpool-backed Redis connections for `RedisStore`.

use deadpool_redis::{Config, Connection, Pool, Runtime};
use konv_core::DomainError;

#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// `redis://[user:password@]host[:port][/db]`
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
        }
    }
}

impl From<&konv_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &konv_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("invalid Redis configuration: {0}")]
    CreatePool(String),

    #[error("no Redis connection available: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Redis(#[from] redis::RedisError),
}

// Every pool failure surfaces to the domain as a storage error
impl From<RedisPoolError> for DomainError {
    fn from(err: RedisPoolError) -> Self {
        DomainError::storage(err)
    }
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

impl RedisPool {
    /// Build the pool. Nothing is dialed until the first connection is
    /// requested, so use `ping` to verify the server at startup.
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?;

        tracing::info!(
            url = %redacted_url(&config.url),
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self { pool })
    }

    pub fn from_config(config: &konv_common::RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    pub async fn get(&self) -> RedisResult<Connection> {
        Ok(self.pool.get().await?)
    }

    /// Round-trip a PING on a pooled connection
    pub async fn ping(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}

/// Strip credentials so the URL can be logged
fn redacted_url(url: &str) -> &str {
    match (url.find("://"), url.rfind('@')) {
        (Some(_), Some(at)) => &url[at + 1..],
        _ => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_redis_config() {
        let redis_config = konv_common::RedisConfig {
            url: "redis://redis.internal:6380/2".to_string(),
            max_connections: 4,
        };
        let pool_config = RedisPoolConfig::from(&redis_config);
        assert_eq!(pool_config.url, "redis://redis.internal:6380/2");
        assert_eq!(pool_config.max_connections, 4);
    }

    #[test]
    fn test_redacted_url() {
        assert_eq!(redacted_url("redis://:secret@cache:6379/0"), "cache:6379/0");
        assert_eq!(redacted_url("redis://cache:6379"), "redis://cache:6379");
    }

    #[test]
    fn test_pool_error_maps_to_storage() {
        let err = DomainError::from(RedisPoolError::CreatePool("bad url".to_string()));
        assert_eq!(err.code(), "STORAGE_ERROR");
        assert!(err.to_string().contains("bad url"));
    }

    #[tokio::test]
    async fn test_ping_unreachable_server_fails() {
        let pool = RedisPool::new(RedisPoolConfig {
            url: "redis://127.0.0.1:1".to_string(),
            max_connections: 1,
        })
        .unwrap();
        assert!(pool.ping().await.is_err());
    }
}
