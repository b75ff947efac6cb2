// src/services/cache.rs

//! Query cache for listing responses.
//!
//! Entries are keyed by the request fields that affect result identity and
//! expire by shelf class. Expired entries are dropped when read; nothing is
//! evicted proactively besides [`QueryCache::clear`].
//!
//! Concurrent misses on the same key share one in-flight fetch through a
//! pending map of per-key `OnceCell`s.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::time::Instant;

use crate::error::Result;
use crate::models::{CacheConfig, ListingsRequest, ListingsResponse, shelves};

const KEY_SEPARATOR: &str = "|";

/// Expiry class of a shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    /// Bestsellers and popular books
    Popular,
    /// Any other named shelf
    Standard,
    /// Recently viewed, or no shelf at all
    Volatile,
}

impl TtlClass {
    pub fn for_shelf(shelf: Option<&str>) -> Self {
        match shelf {
            Some(shelves::POPULAR_BOOKS | shelves::BEST_SELLERS) => TtlClass::Popular,
            Some(s) if !s.to_lowercase().contains("viewed") => TtlClass::Standard,
            _ => TtlClass::Volatile,
        }
    }
}

/// Durations for each [`TtlClass`].
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    pub popular: Duration,
    pub standard: Duration,
    pub volatile: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for TtlPolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            popular: config.popular_ttl(),
            standard: config.standard_ttl(),
            volatile: config.volatile_ttl(),
        }
    }
}

impl TtlPolicy {
    pub fn ttl_for(&self, shelf: Option<&str>) -> Duration {
        match TtlClass::for_shelf(shelf) {
            TtlClass::Popular => self.popular,
            TtlClass::Standard => self.standard,
            TtlClass::Volatile => self.volatile,
        }
    }
}

/// Canonical cache key for a listings request.
///
/// Fixed order: shelf, category, subcategory, search, sort, page, limit.
/// A non-empty filter map is appended as key-sorted JSON.
pub fn cache_key(request: &ListingsRequest) -> String {
    let mut parts = vec![
        request.shelf.clone().unwrap_or_default(),
        request.category.clone().unwrap_or_default(),
        request.subcategory.clone().unwrap_or_default(),
        request.search.clone().unwrap_or_default(),
        request.sort.clone(),
        request.page.to_string(),
        request.limit.to_string(),
    ];
    if !request.filters.is_empty() {
        // BTreeMap serializes in key order
        parts.push(serde_json::to_string(&request.filters).unwrap_or_default());
    }
    parts.join(KEY_SEPARATOR)
}

#[derive(Debug, Clone)]
struct CacheEntry {
    response: Arc<ListingsResponse>,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) < self.ttl
    }
}

type Flight = Arc<OnceCell<Arc<ListingsResponse>>>;

/// Shared memo of normalized listing responses.
///
/// Create one per application and hand it to every consumer; call
/// [`clear`](Self::clear) on explicit invalidation events.
#[derive(Debug, Default)]
pub struct QueryCache {
    policy: TtlPolicy,
    entries: Mutex<HashMap<String, CacheEntry>>,
    pending: Mutex<HashMap<String, Flight>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl QueryCache {
    pub fn new(policy: TtlPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.policy
    }

    /// Live entry for `key`, dropping it if expired.
    pub fn get(&self, key: &str) -> Option<Arc<ListingsResponse>> {
        let mut entries = lock(&self.entries);
        let entry = entries.get(key)?;
        if entry.is_live(Instant::now()) {
            return Some(Arc::clone(&entry.response));
        }
        log::debug!("cache entry expired: {}", key);
        entries.remove(key);
        None
    }

    pub fn insert(&self, key: impl Into<String>, shelf: Option<&str>, response: Arc<ListingsResponse>) {
        let entry = CacheEntry {
            response,
            stored_at: Instant::now(),
            ttl: self.policy.ttl_for(shelf),
        };
        lock(&self.entries).insert(key.into(), entry);
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    /// Number of stored entries, live or not yet found expired.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached response for `request`, or run `fetch` to fill it.
    ///
    /// Callers that miss while a fetch for the same key is in flight wait for
    /// that fetch instead of starting their own. If the in-flight fetch fails
    /// or is dropped, the next waiter runs its own `fetch`.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        request: &ListingsRequest,
        fetch: F,
    ) -> Result<Arc<ListingsResponse>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ListingsResponse>>,
    {
        let key = cache_key(request);
        if let Some(hit) = self.get(&key) {
            log::debug!("cache hit: {}", key);
            return Ok(hit);
        }

        let flight: Flight = Arc::clone(lock(&self.pending).entry(key.clone()).or_default());

        let result = flight
            .get_or_try_init(|| async {
                // A flight may have landed between the miss above and joining
                if let Some(hit) = self.get(&key) {
                    return Ok(hit);
                }
                log::debug!("cache miss: {}", key);
                let response = Arc::new(fetch().await?);
                self.insert(key.clone(), request.shelf.as_deref(), Arc::clone(&response));
                Ok(response)
            })
            .await
            .cloned();

        let mut pending = lock(&self.pending);
        if pending.get(&key).is_some_and(|current| Arc::ptr_eq(current, &flight)) {
            pending.remove(&key);
        }
        result
    }
}
