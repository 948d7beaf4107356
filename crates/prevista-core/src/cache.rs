//! Time-bounded in-memory caching for upstream responses.
//!
//! Entries are keyed by the exact call signature (the full request URL) and
//! expire by age only; nothing invalidates them explicitly. The cache exists
//! purely to reduce redundant upstream traffic across repeated renders.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    default_ttl: Duration,
}

impl CacheInner {
    fn new(default_ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            default_ttl,
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).and_then(|entry| {
            if Instant::now() <= entry.expires_at {
                Some(entry.body.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, key: String, body: String, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let expires_at = Instant::now() + ttl;
        self.map.insert(key, CacheEntry { body, expires_at });
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expires_at > now);
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Thread-safe TTL cache shared by the provider adapters.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl CacheStore {
    /// Create a cache store with an explicit default TTL. Lifetime is a
    /// constructor parameter, never ambient state.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(default_ttl))),
        }
    }

    /// Default TTL of 5 minutes, the shortest window any adapter uses.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(300))
    }

    /// Disabled cache: reads always miss, writes are dropped.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.inner.read().await;
        store.get(key)
    }

    pub async fn put(&self, key: String, body: String, ttl_override: Option<Duration>) {
        let mut store = self.inner.write().await;

        if store.default_ttl == Duration::ZERO {
            return;
        }

        store.put(key, body, ttl_override);
    }

    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired();
    }

    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.len()
    }

    pub async fn is_disabled(&self) -> bool {
        let store = self.inner.read().await;
        store.default_ttl == Duration::ZERO
    }
}
