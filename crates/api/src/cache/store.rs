//! Cache storage abstraction and the in-process implementation.
//!
//! The coordinator only ever talks to [`CacheStore`], so the backing
//! store can be swapped (e.g. for a networked cache) without touching
//! any read path. Errors here never propagate past the coordinator.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Error from the backing cache store.
///
/// Always absorbed by the coordinator: a failed read is a miss, a failed
/// write or invalidation is logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store with TTL expiry and pattern deletion.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value. Expired entries read as absent.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value with a time-to-live.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Delete every key matching `pattern` and return how many were
    /// removed. A trailing `*` matches any suffix; otherwise the match
    /// is exact. Zero matches is a silent no-op, not an error.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError>;
}

/// Whether `key` matches `pattern` (trailing-`*` prefix match or exact).
pub(crate) fn key_matches(key: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

/// A cached value with its absolute expiry instant.
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Process-local cache store.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc`
/// and shared across the application. Expired entries are dropped lazily:
/// reads treat them as absent and each write sweeps them out.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let matching: Vec<String> = entries
            .keys()
            .filter(|key| key_matches(key, pattern))
            .cloned()
            .collect();
        for key in &matching {
            entries.remove(key);
        }
        Ok(matching.len() as u64)
    }
}
