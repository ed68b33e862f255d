//! Cache store seam and the in-process default store.
//!
//! The middleware never assumes anything about where entries live. It talks
//! to a [`CacheStore`] through three calls and treats every failure as a
//! miss. [`MemoryStore`] is the process-local default.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::error::StoreError;

/// Boxed future returned by [`CacheStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// An async key-value store for encoded responses.
///
/// Eviction, persistence and distribution are the store's business. The
/// cache only reads, writes with an optional TTL, and deletes.
pub trait CacheStore: Send + Sync {
    /// Look up `key`. `Ok(None)` means absent or expired.
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Bytes>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set<'a>(&'a self, key: &'a str, value: Bytes, ttl: Option<Duration>) -> StoreFuture<'a, ()>;

    /// Remove `key` if present.
    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: Bytes,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Writes between two sweeps of expired entries in [`MemoryStore`].
const SWEEP_INTERVAL: usize = 64;

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, Entry>,
    writes_since_sweep: usize,
}

impl Entries {
    fn sweep(&mut self, now: Instant) {
        let before = self.map.len();
        self.map.retain(|_, entry| !entry.is_expired(now));
        self.writes_since_sweep = 0;
        tracing::trace!(removed = before - self.map.len(), "swept expired cache entries");
    }
}

/// An in-memory [`CacheStore`] shared by every task in the process.
///
/// An expired entry is dropped when it is next read, and every
/// `SWEEP_INTERVAL` writes the whole map is swept, so keys that are never
/// read again do not pile up. Live entries are never evicted.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use response_cache::cache::{CacheStore, MemoryStore};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = MemoryStore::new();
/// store.set("/", Bytes::from_static(b"x"), None).await.unwrap();
/// assert_eq!(store.get("/").await.unwrap(), Some(Bytes::from_static(b"x")));
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.map.is_empty()
    }
}

impl CacheStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Bytes>> {
        Box::pin(async move {
            let now = Instant::now();
            {
                let entries = self.entries.read().await;
                match entries.map.get(key) {
                    None => return Ok(None),
                    Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                    Some(_) => {}
                }
            }

            // Re-check under the write lock; a writer may have refreshed it.
            let mut entries = self.entries.write().await;
            if entries.map.get(key).is_some_and(|entry| entry.is_expired(now)) {
                entries.map.remove(key);
                return Ok(None);
            }
            Ok(entries.map.get(key).map(|entry| entry.value.clone()))
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: Bytes, ttl: Option<Duration>) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let now = Instant::now();
            let entry = Entry {
                value,
                expires_at: ttl.map(|ttl| now + ttl),
            };

            let mut entries = self.entries.write().await;
            entries.writes_since_sweep += 1;
            if entries.writes_since_sweep >= SWEEP_INTERVAL {
                entries.sweep(now);
            }
            entries.map.insert(key.to_owned(), entry);
            Ok(())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.entries.write().await.map.remove(key);
            Ok(())
        })
    }
}
