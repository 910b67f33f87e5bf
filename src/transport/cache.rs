//! The validator cache backing conditional requests.
//!
//! Successful responses that carry an `ETag` header have their bodies stored
//! here, keyed by the validator. When a later conditional request comes back
//! `304 Not Modified`, the transport looks the request's `If-Match` value up
//! and substitutes the stored body as if it were fresh. Entries are read,
//! never removed, by that resolution path.
//!
//! The cache is shared across the whole resource tree for the lifetime of
//! the client, and bounded: beyond capacity, the least-recently-used entry
//! is evicted. Validators are content-addressed (one etag names exactly one
//! body version), so eviction only ever costs a refetch, never correctness —
//! an evicted validator simply surfaces as
//! [`CacheMiss`](crate::ApiError::CacheMiss) and the caller refetches
//! unconditionally.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tracing::debug;

/// A bounded, LRU-evicting store of `etag -> body` pairs.
///
/// Cheap to clone; clones share one underlying store, so every handle on a
/// client observes the same entries. Mutations are serialized by a `Mutex`;
/// last-write-wins on colliding keys is acceptable because etags are unique
/// per resource version.
#[derive(Clone, Debug)]
pub struct EtagCache {
    inner: Arc<Mutex<CacheInner>>,
}

#[derive(Debug)]
struct CacheInner {
    capacity: usize,
    entries: HashMap<String, serde_json::Value>,
    // Recency queue: least-recently-used at the front.
    order: VecDeque<String>,
}

impl EtagCache {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero disables storage entirely: every conditional
    /// resolution will miss.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                capacity,
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }

    /// Stores (or overwrites) the body for a validator, evicting the
    /// least-recently-used entry if the cache is full.
    pub fn store(&self, etag: &str, body: serde_json::Value) {
        let mut inner = self.lock();
        if inner.capacity == 0 {
            return;
        }
        if inner.entries.insert(etag.to_string(), body).is_some() {
            inner.promote(etag);
        } else {
            inner.order.push_back(etag.to_string());
            if inner.entries.len() > inner.capacity {
                if let Some(evicted) = inner.order.pop_front() {
                    inner.entries.remove(&evicted);
                    debug!(etag = %evicted, "validator cache evicted entry");
                }
            }
        }
        debug!(%etag, entries = inner.entries.len(), "validator cache stored body");
    }

    /// Returns the stored body for a validator, if present, marking the
    /// entry as recently used.
    #[must_use]
    pub fn lookup(&self, etag: &str) -> Option<serde_json::Value> {
        let mut inner = self.lock();
        let body = inner.entries.get(etag).cloned()?;
        inner.promote(etag);
        debug!(%etag, "validator cache hit");
        Some(body)
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        // A poisoned lock means a panic mid-mutation; the entries map and
        // recency queue are updated independently, but a torn pair only
        // costs an early eviction or a stray queue key, never a wrong body.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CacheInner {
    /// Moves a key to the most-recently-used position.
    fn promote(&mut self, etag: &str) {
        if let Some(position) = self.order.iter().position(|key| key == etag) {
            self.order.remove(position);
        }
        self.order.push_back(etag.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_then_lookup_round_trips() {
        let cache = EtagCache::new(8);
        cache.store("\"v1\"", json!({"api_response": {"x": 1}}));

        assert_eq!(
            cache.lookup("\"v1\""),
            Some(json!({"api_response": {"x": 1}}))
        );
        // Resolution reads without removing.
        assert_eq!(cache.len(), 1);
        assert!(cache.lookup("\"v1\"").is_some());
    }

    #[test]
    fn test_unknown_validator_misses() {
        let cache = EtagCache::new(8);
        cache.store("\"v1\"", json!(1));
        assert_eq!(cache.lookup("\"v2\""), None);
    }

    #[test]
    fn test_overwrite_replaces_body() {
        let cache = EtagCache::new(8);
        cache.store("\"v1\"", json!(1));
        cache.store("\"v1\"", json!(2));
        assert_eq!(cache.lookup("\"v1\""), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = EtagCache::new(2);
        cache.store("a", json!(1));
        cache.store("b", json!(2));
        cache.store("c", json!(3));

        assert_eq!(cache.lookup("a"), None);
        assert!(cache.lookup("b").is_some());
        assert!(cache.lookup("c").is_some());
    }

    #[test]
    fn test_lookup_refreshes_recency() {
        let cache = EtagCache::new(2);
        cache.store("a", json!(1));
        cache.store("b", json!(2));

        // Touch "a" so "b" becomes the eviction candidate.
        assert!(cache.lookup("a").is_some());
        cache.store("c", json!(3));

        assert!(cache.lookup("a").is_some());
        assert_eq!(cache.lookup("b"), None);
        assert!(cache.lookup("c").is_some());
    }

    #[test]
    fn test_zero_capacity_disables_storage() {
        let cache = EtagCache::new(0);
        cache.store("a", json!(1));
        assert!(cache.is_empty());
        assert_eq!(cache.lookup("a"), None);
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = EtagCache::new(4);
        cache.store("a", json!(1));
        cache.store("b", json!(2));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.lookup("a"), None);
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = EtagCache::new(4);
        let other = cache.clone();
        cache.store("a", json!(1));
        assert_eq!(other.lookup("a"), Some(json!(1)));
    }
}
