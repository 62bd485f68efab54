//! In-memory response cache
//!
//! One entry per key (a GitHub login), valid for [`CACHE_TTL`] after its value
//! was published. Concurrent callers for a missing or expired key share a
//! single fetch.

use crate::error::FetchError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::debug;

/// Lifetime of a cached listing
pub const CACHE_TTL: Duration = Duration::from_secs(60);

/// A published value and when it was published
type Stamped<V> = (Instant, Result<V, FetchError>);

struct CacheEntry<V> {
    /// Empty while the fetch is in flight
    value: OnceCell<Stamped<V>>,
}

impl<V> CacheEntry<V> {
    fn new() -> Self {
        Self {
            value: OnceCell::new(),
        }
    }

    /// In-flight entries never expire; callers join them instead
    fn is_expired(&self, ttl: Duration) -> bool {
        self.value
            .get()
            .is_some_and(|(published, _)| published.elapsed() >= ttl)
    }
}

/// Key -> fetched value, with TTL and single-flight fetches
pub struct KeyedCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Arc<CacheEntry<V>>>>,
}

impl<V: Clone> Default for KeyedCache<V> {
    fn default() -> Self {
        Self::new(CACHE_TTL)
    }
}

impl<V: Clone> KeyedCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the live value for `key`, or run `fetcher` to produce one.
    ///
    /// Callers arriving while a fetch for `key` is in flight wait for it
    /// instead of starting their own. A failed fetch is handed to everyone who
    /// waited on it but is not kept. If the caller driving the fetch is
    /// dropped, nothing is published and the next waiter runs its fetcher.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetcher: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, FetchError>>,
    {
        let key = normalize_key(key);
        let entry = self.entry_for(&key);
        let fetch_key = key.as_str();

        let (_, result) = entry
            .value
            .get_or_init(move || async move {
                debug!("Cache fetch for {}", fetch_key);
                let result = fetcher().await;
                (Instant::now(), result)
            })
            .await;
        let result = result.clone();

        if result.is_err() {
            self.evict_if_current(&key, &entry);
        }
        result
    }

    /// Live value for `key` without fetching
    #[allow(dead_code)]
    pub fn peek(&self, key: &str) -> Option<Result<V, FetchError>> {
        let entries = self.lock();
        entries
            .get(&normalize_key(key))
            .filter(|entry| !entry.is_expired(self.ttl))
            .and_then(|entry| entry.value.get())
            .map(|(_, result)| result.clone())
    }

    /// Number of keys with an entry, live, expired or in flight
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry_for(&self, key: &str) -> Arc<CacheEntry<V>> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                if entry.value.initialized() {
                    debug!("Cache hit for {}", key);
                } else {
                    debug!("Joining in-flight fetch for {}", key);
                }
                entry.clone()
            }
            existing => {
                if existing.is_some() {
                    debug!("Cache entry for {} expired", key);
                }
                let entry = Arc::new(CacheEntry::new());
                entries.insert(key.to_string(), entry.clone());
                entry
            }
        }
    }

    /// Drop `entry` unless it has already been replaced
    fn evict_if_current(&self, key: &str, entry: &Arc<CacheEntry<V>>) {
        let mut entries = self.lock();
        if entries.get(key).is_some_and(|e| Arc::ptr_eq(e, entry)) {
            entries.remove(key);
            debug!("Discarded failed fetch for {}", key);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<CacheEntry<V>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// GitHub logins are case-insensitive
fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
