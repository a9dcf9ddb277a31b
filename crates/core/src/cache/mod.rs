use crate::domain::recommendation::Recommendation;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Ephemeral response cache. Keys are opaque strings; the engine uses
/// `rec:{attraction_id}:{start_date}:{days}d`. Stale entries are treated
/// as misses, never served.
pub trait RecommendationCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Recommendation>;
    fn set(&self, key: &str, value: Recommendation, ttl: Duration);
}

#[derive(Debug)]
struct CacheEntry {
    value: Recommendation,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local cache backing the default engine. Expired entries are
/// evicted lazily on read.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    store: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecommendationCache for InMemoryCache {
    fn get(&self, key: &str) -> Option<Recommendation> {
        let Ok(mut store) = self.store.lock() else {
            tracing::warn!("recommendation cache lock poisoned; treating as miss");
            return None;
        };
        match store.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            Some(_) => {
                store.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: Recommendation, ttl: Duration) {
        let Ok(mut store) = self.store.lock() else {
            tracing::warn!("recommendation cache lock poisoned; dropping entry");
            return;
        };
        store.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}

/// Cache that stores nothing. Used when every request must recompute.
#[derive(Debug, Default)]
pub struct NoopCache;

impl RecommendationCache for NoopCache {
    fn get(&self, _key: &str) -> Option<Recommendation> {
        None
    }

    fn set(&self, _key: &str, _value: Recommendation, _ttl: Duration) {}
}
