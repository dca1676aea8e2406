use crate::config::CacheConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
    #[error("Cache lock error: {0}")]
    LockError(String),
    #[error("Cache maximum size exceeded")]
    MaxSizeExceeded,
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),
}

// Cache entry with expiration support
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    created_at: Instant,
    access_count: u64,
}

impl<T: Clone> CacheEntry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            access_count: 1,
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }

    fn access(&mut self) -> T {
        self.access_count += 1;
        self.value.clone()
    }
}

/// Key-value store consulted before every upstream read. Keys are canonical
/// request URLs.
pub trait CacheTrait<T>: Send + Sync
where
    T: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<T>;
    fn insert(&self, key: String, value: T) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Option<T>;
    fn clear(&self);
    fn size(&self) -> usize;
    fn hit_rate(&self) -> f64;
    fn cleanup_expired(&self);
}

#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub removes: u64,
    pub cleanups: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

/// In-process response cache with a fixed time-to-live and a size cap.
pub struct InmemoryCache<T>
where
    T: Clone + Send + Sync,
{
    store: Mutex<HashMap<String, CacheEntry<T>>>,
    config: CacheConfig,
    stats: Mutex<CacheStats>,
}

impl<T> InmemoryCache<T>
where
    T: Clone + Send + Sync,
{
    pub fn new(config: CacheConfig) -> Self {
        tracing::info!(
            "Initializing in-memory cache with max_size: {}, expiration: {}s",
            config.max_size,
            config.expiration
        );

        Self {
            store: Mutex::new(HashMap::new()),
            config,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    fn record(&self, update: impl FnOnce(&mut CacheStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            update(&mut stats);
        }
    }

    // Drops the oldest, least used entry once the store is at capacity.
    fn evict_oldest(&self, store: &mut HashMap<String, CacheEntry<T>>) {
        if store.len() < self.config.max_size as usize {
            return;
        }

        let oldest = store
            .iter()
            .min_by(|a, b| {
                a.1.created_at
                    .cmp(&b.1.created_at)
                    .then_with(|| a.1.access_count.cmp(&b.1.access_count))
            })
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            store.remove(&key);
            tracing::debug!("Evicted cache entry: {}", key);
            self.record(|stats| stats.removes += 1);
        }
    }
}

impl<T> Default for InmemoryCache<T>
where
    T: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<T> CacheTrait<T> for InmemoryCache<T>
where
    T: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<T> {
        if key.is_empty() {
            tracing::warn!("Attempted to get cache entry with empty key");
            return None;
        }

        let ttl = self.config.ttl();
        let mut store = match self.store.lock() {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("Failed to acquire cache lock for key {}: {}", key, e);
                return None;
            }
        };

        let expired = match store.get_mut(key) {
            Some(entry) if !entry.is_expired(ttl) => {
                tracing::debug!("Cache hit for key: {}", key);
                self.record(|stats| stats.hits += 1);
                return Some(entry.access());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            tracing::debug!("Cache entry expired for key: {}", key);
            store.remove(key);
            self.record(|stats| stats.removes += 1);
        } else {
            tracing::debug!("Cache miss for key: {}", key);
        }
        self.record(|stats| stats.misses += 1);
        None
    }

    fn insert(&self, key: String, value: T) -> Result<(), CacheError> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
        }
        if self.config.max_size == 0 {
            return Err(CacheError::MaxSizeExceeded);
        }

        let mut store = self.store.lock().map_err(|e| {
            let error_msg = format!("Failed to acquire cache write lock: {}", e);
            tracing::error!("{}", error_msg);
            CacheError::LockError(error_msg)
        })?;

        if !store.contains_key(&key) {
            self.evict_oldest(&mut store);
        }

        if store.insert(key.clone(), CacheEntry::new(value)).is_some() {
            tracing::debug!("Refreshed cache entry: {}", key);
        } else {
            tracing::debug!("Inserted cache entry: {}", key);
        }
        self.record(|stats| stats.inserts += 1);

        Ok(())
    }

    fn remove(&self, key: &str) -> Option<T> {
        let mut store = match self.store.lock() {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("Failed to acquire cache lock for removal of {}: {}", key, e);
                return None;
            }
        };
        let removed = store.remove(key).map(|entry| entry.value);
        if removed.is_some() {
            tracing::debug!("Removed cache entry: {}", key);
            self.record(|stats| stats.removes += 1);
        }
        removed
    }

    fn clear(&self) {
        match self.store.lock() {
            Ok(mut store) => {
                let size = store.len();
                store.clear();
                tracing::info!("Cleared cache ({} entries)", size);
                self.record(|stats| *stats = CacheStats::default());
            }
            Err(e) => tracing::error!("Failed to acquire cache lock for clearing: {}", e),
        }
    }

    fn size(&self) -> usize {
        self.store.lock().map(|store| store.len()).unwrap_or(0)
    }

    fn hit_rate(&self) -> f64 {
        self.stats.lock().map(|stats| stats.hit_rate()).unwrap_or(0.0)
    }

    fn cleanup_expired(&self) {
        let ttl = self.config.ttl();
        let Ok(mut store) = self.store.lock() else {
            tracing::error!("Failed to acquire lock for cache cleanup");
            return;
        };

        let before = store.len();
        store.retain(|_, entry| !entry.is_expired(ttl));
        let expired = before - store.len();

        if expired > 0 {
            tracing::debug!("Cleaned up {} expired cache entries", expired);
            self.record(|stats| {
                stats.cleanups += 1;
                stats.removes += expired as u64;
            });
        }
    }
}

/// A cache that stores nothing. Every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCache;

impl<T> CacheTrait<T> for DisabledCache
where
    T: Clone + Send + Sync,
{
    fn get(&self, _key: &str) -> Option<T> {
        None
    }

    fn insert(&self, _key: String, _value: T) -> Result<(), CacheError> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Option<T> {
        None
    }

    fn clear(&self) {}

    fn size(&self) -> usize {
        0
    }

    fn hit_rate(&self) -> f64 {
        0.0
    }

    fn cleanup_expired(&self) {}
}

/// Periodically drops expired entries until the returned handle is aborted
/// or the runtime shuts down.
pub fn spawn_cleanup_task<T>(cache: Arc<dyn CacheTrait<T>>, period: Duration) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            tracing::debug!("Starting periodic cache cleanup");
            cache.cleanup_expired();
        }
    })
}

/// Builds the cache selected by `config.type`.
pub fn build_cache<T>(config: &CacheConfig) -> Arc<dyn CacheTrait<T>>
where
    T: Clone + Send + Sync + 'static,
{
    if config.r#type == "memory" {
        Arc::new(InmemoryCache::new(config.clone()))
    } else {
        tracing::info!("Response cache disabled (type = {:?})", config.r#type);
        Arc::new(DisabledCache)
    }
}
