//! Cache-aside coordinator for derived read views.
//!
//! Reads go through [`CacheCoordinator::get_or_set`]: a hit returns the
//! cached value, a miss invokes the factory and re-populates the cache.
//! Writes invalidate by key *pattern*, not by key, so list views keyed
//! by arbitrary filter combinations are swept along with detail views.
//!
//! The cache is a performance optimization, never a correctness
//! dependency: every store failure is logged and degrades to a miss or a
//! skipped invalidation, and never reaches the caller.

pub mod store;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use faultline_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use store::{CacheError, CacheStore, MemoryStore};

/// Default TTL for cached views when the caller does not pass one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

// ---------------------------------------------------------------------------
// Key builders
// ---------------------------------------------------------------------------

/// Cache key naming scheme.
///
/// Invalidation relies on these shapes: detail keys are exact,
/// list keys share a prefix swept with a trailing `*`.
pub mod keys {
    use faultline_core::types::DbId;

    /// Detail view (timeline and related aggregates) for one ticket.
    pub fn ticket_detail(ticket_id: DbId) -> String {
        format!("ticket:detail:{ticket_id}")
    }

    /// Pattern covering every cached ticket list view.
    pub const TICKET_LIST_PATTERN: &str = "ticket:list:*";

    /// Pause intervals for one ticket.
    pub fn pause_ticket(ticket_id: DbId) -> String {
        format!("pause:ticket:{ticket_id}")
    }

    /// Pattern covering every cached pause list view.
    pub const PAUSE_LIST_PATTERN: &str = "pause:list:*";
}

// ---------------------------------------------------------------------------
// CacheCoordinator
// ---------------------------------------------------------------------------

/// Cache-aside wrapper shared across handlers via [`AppState`].
///
/// Values are serde_json-encoded, so producers and consumers agree on
/// field naming through the serde derives of the cached type.
///
/// [`AppState`]: crate::state::AppState
#[derive(Clone)]
pub struct CacheCoordinator {
    store: Arc<dyn CacheStore>,
    default_ttl: Duration,
}

impl CacheCoordinator {
    /// Wrap an existing store.
    pub fn new(store: Arc<dyn CacheStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// Coordinator backed by a fresh process-local [`MemoryStore`].
    pub fn in_memory(default_ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryStore::new()), default_ttl)
    }

    /// Return the cached value under `key`, or run `factory`, cache its
    /// result, and return it.
    ///
    /// `ttl = None` applies the coordinator's default. Factory errors
    /// propagate untouched; cache errors never do -- a failed read is a
    /// miss and a failed write means the next read recomputes.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        factory: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => return Ok(value),
                Err(error) => {
                    // Stale shape from an older build: recompute below.
                    tracing::warn!(key, %error, "Discarding undecodable cache entry");
                }
            },
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(key, %error, "Cache read failed, treating as miss");
            }
        }

        let value = factory().await?;

        match serde_json::to_string(&value) {
            Ok(raw) => {
                let ttl = ttl.unwrap_or(self.default_ttl);
                if let Err(error) = self.store.set(key, raw, ttl).await {
                    tracing::warn!(key, %error, "Cache write failed, value not cached");
                }
            }
            Err(error) => {
                tracing::warn!(key, %error, "Failed to encode value for caching");
            }
        }

        Ok(value)
    }

    /// Delete every key matching each of the given patterns.
    ///
    /// Zero matches is a silent no-op; store failures are logged and
    /// swallowed so invalidation never fails the surrounding write.
    pub async fn invalidate(&self, patterns: &[&str]) {
        for &pattern in patterns {
            match self.store.delete_pattern(pattern).await {
                Ok(removed) if removed > 0 => {
                    tracing::debug!(pattern, removed, "Invalidated cache keys");
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(pattern, %error, "Cache invalidation failed, skipped");
                }
            }
        }
    }

    /// Invalidate the views affected by any write to a ticket.
    pub async fn invalidate_ticket(&self, ticket_id: DbId) {
        let detail = keys::ticket_detail(ticket_id);
        self.invalidate(&[detail.as_str(), keys::TICKET_LIST_PATTERN])
            .await;
    }

    /// Invalidate the pause views for a ticket (pause/resume writes).
    pub async fn invalidate_pauses(&self, ticket_id: DbId) {
        let detail = keys::pause_ticket(ticket_id);
        self.invalidate(&[detail.as_str(), keys::PAUSE_LIST_PATTERN])
            .await;
    }
}
