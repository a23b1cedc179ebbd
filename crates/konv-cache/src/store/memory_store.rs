//! In-process key-value store.
//!
//! Mirrors the Redis semantics the repository relies on: typed keys,
//! `WRONGTYPE` failures, negative list indices, and empty collections
//! disappearing.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use konv_core::{DomainError, KeyValueStore, RepoResult};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
enum Entry {
    Scalar(String),
    Hash(HashMap<String, String>),
    List(VecDeque<String>),
}

fn wrong_type(key: &str) -> DomainError {
    DomainError::storage(format!(
        "WRONGTYPE Operation against a key holding the wrong kind of value: {key}"
    ))
}

/// Resolve a Redis-style inclusive range against a list of `len` items.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// `KeyValueStore` held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn key_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether a key exists, regardless of its type
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        match self.entries.lock().get(key) {
            None => Ok(None),
            Some(Entry::Scalar(value)) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), Entry::Scalar(value.to_string()));
        Ok(())
    }

    async fn take(&self, key: &str) -> RepoResult<Option<String>> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            None => Ok(None),
            Some(Entry::Scalar(_)) => match entries.remove(key) {
                Some(Entry::Scalar(value)) => Ok(Some(value)),
                _ => Ok(None),
            },
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn delete(&self, key: &str) -> RepoResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> RepoResult<i64> {
        let mut entries = self.entries.lock();
        let current = match entries.get(key) {
            None => 0,
            Some(Entry::Scalar(value)) => value.parse::<i64>().map_err(|_| {
                DomainError::storage("ERR value is not an integer or out of range")
            })?,
            Some(_) => return Err(wrong_type(key)),
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| DomainError::storage("ERR increment or decrement would overflow"))?;
        entries.insert(key.to_string(), Entry::Scalar(next.to_string()));
        Ok(next)
    }

    async fn hash_get_all(&self, key: &str) -> RepoResult<HashMap<String, String>> {
        match self.entries.lock().get(key) {
            None => Ok(HashMap::new()),
            Some(Entry::Hash(map)) => Ok(map.clone()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> RepoResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut entries = self.entries.lock();
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(HashMap::new()));
        let Entry::Hash(map) = entry else {
            return Err(wrong_type(key));
        };
        for (field, value) in fields {
            map.insert((*field).to_string(), (*value).to_string());
        }
        Ok(())
    }

    async fn list_push_front(&self, key: &str, value: &str) -> RepoResult<()> {
        let mut entries = self.entries.lock();
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()));
        let Entry::List(list) = entry else {
            return Err(wrong_type(key));
        };
        list.push_front(value.to_string());
        Ok(())
    }

    async fn list_push_back(&self, key: &str, value: &str) -> RepoResult<()> {
        let mut entries = self.entries.lock();
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()));
        let Entry::List(list) = entry else {
            return Err(wrong_type(key));
        };
        list.push_back(value.to_string());
        Ok(())
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> RepoResult<Vec<String>> {
        match self.entries.lock().get(key) {
            None => Ok(Vec::new()),
            Some(Entry::List(list)) => Ok(resolve_range(list.len(), start, stop)
                .map(|(from, to)| list.range(from..=to).cloned().collect())
                .unwrap_or_default()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn list_remove(&self, key: &str, value: &str) -> RepoResult<usize> {
        let mut entries = self.entries.lock();
        let removed = match entries.get_mut(key) {
            None => return Ok(0),
            Some(Entry::List(list)) => {
                let before = list.len();
                list.retain(|item| item != value);
                before - list.len()
            }
            Some(_) => return Err(wrong_type(key)),
        };
        if matches!(entries.get(key), Some(Entry::List(list)) if list.is_empty()) {
            entries.remove(key);
        }
        Ok(removed)
    }

    async fn list_len(&self, key: &str) -> RepoResult<usize> {
        match self.entries.lock().get(key) {
            None => Ok(0),
            Some(Entry::List(list)) => Ok(list.len()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}
