//! Redis-backed key-value store.

use std::collections::HashMap;

use async_trait::async_trait;
use konv_core::{DomainError, KeyValueStore, RepoResult};
use redis::AsyncCommands;

use crate::pool::RedisPool;

/// `KeyValueStore` over a pooled Redis connection.
///
/// Each call checks out a connection, runs one command and returns it.
#[derive(Debug, Clone)]
pub struct RedisStore {
    pool: RedisPool,
}

impl RedisStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool
    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = conn.get(key).await.map_err(DomainError::storage)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        let mut conn = self.pool.get().await?;
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(DomainError::storage)
    }

    async fn take(&self, key: &str) -> RepoResult<Option<String>> {
        let mut conn = self.pool.get().await?;
        redis::cmd("GETDEL")
            .arg(key)
            .query_async::<Option<String>>(&mut conn)
            .await
            .map_err(DomainError::storage)
    }

    async fn delete(&self, key: &str) -> RepoResult<()> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(key).await.map_err(DomainError::storage)
    }

    async fn incr(&self, key: &str) -> RepoResult<i64> {
        let mut conn = self.pool.get().await?;
        conn.incr::<_, _, i64>(key, 1_i64)
            .await
            .map_err(DomainError::storage)
    }

    async fn hash_get_all(&self, key: &str) -> RepoResult<HashMap<String, String>> {
        let mut conn = self.pool.get().await?;
        conn.hgetall::<_, HashMap<String, String>>(key)
            .await
            .map_err(DomainError::storage)
    }

    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> RepoResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await?;
        conn.hset_multiple::<_, _, _, ()>(key, fields)
            .await
            .map_err(DomainError::storage)
    }

    async fn list_push_front(&self, key: &str, value: &str) -> RepoResult<()> {
        let mut conn = self.pool.get().await?;
        conn.lpush::<_, _, ()>(key, value)
            .await
            .map_err(DomainError::storage)
    }

    async fn list_push_back(&self, key: &str, value: &str) -> RepoResult<()> {
        let mut conn = self.pool.get().await?;
        conn.rpush::<_, _, ()>(key, value)
            .await
            .map_err(DomainError::storage)
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> RepoResult<Vec<String>> {
        let mut conn = self.pool.get().await?;
        conn.lrange::<_, Vec<String>>(key, start, stop)
            .await
            .map_err(DomainError::storage)
    }

    async fn list_remove(&self, key: &str, value: &str) -> RepoResult<usize> {
        let mut conn = self.pool.get().await?;
        // count 0 removes every occurrence
        conn.lrem::<_, _, usize>(key, 0, value)
            .await
            .map_err(DomainError::storage)
    }

    async fn list_len(&self, key: &str) -> RepoResult<usize> {
        let mut conn = self.pool.get().await?;
        conn.llen::<_, usize>(key)
            .await
            .map_err(DomainError::storage)
    }

    async fn ping(&self) -> RepoResult<()> {
        self.pool.ping().await.map_err(DomainError::from)
    }
}
