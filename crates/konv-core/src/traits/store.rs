//! Key-value store port
//!
//! An ordered-list + hash-map store addressed by string keys. There are no
//! transactions: every call is an independent round trip, and callers must
//! tolerate interleaving with other writers.

use std::collections::HashMap;

use async_trait::async_trait;

use super::repositories::RepoResult;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a scalar value
    async fn get(&self, key: &str) -> RepoResult<Option<String>>;

    /// Write a scalar value
    async fn set(&self, key: &str, value: &str) -> RepoResult<()>;

    /// Atomically read and delete a scalar value
    async fn take(&self, key: &str) -> RepoResult<Option<String>>;

    /// Delete a key of any type. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> RepoResult<()>;

    /// Increment an integer scalar (missing counts as zero) and return the new value
    async fn incr(&self, key: &str) -> RepoResult<i64>;

    /// Read every field of a hash; a missing hash reads as empty
    async fn hash_get_all(&self, key: &str) -> RepoResult<HashMap<String, String>>;

    /// Write several hash fields, leaving other fields untouched
    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> RepoResult<()>;

    /// Prepend a value to a list
    async fn list_push_front(&self, key: &str, value: &str) -> RepoResult<()>;

    /// Append a value to a list
    async fn list_push_back(&self, key: &str, value: &str) -> RepoResult<()>;

    /// Read list elements `start..=stop`; negative indices count from the end
    async fn list_range(&self, key: &str, start: isize, stop: isize) -> RepoResult<Vec<String>>;

    /// Remove every occurrence of `value`, returning how many were removed
    async fn list_remove(&self, key: &str, value: &str) -> RepoResult<usize>;

    /// Length of a list; a missing list has length zero
    async fn list_len(&self, key: &str) -> RepoResult<usize>;

    /// Check connectivity
    async fn ping(&self) -> RepoResult<()>;
}
