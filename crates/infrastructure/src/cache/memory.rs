use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use ferrous_doh_application::ports::CacheStore;
use ferrous_doh_domain::DomainError;
use rustc_hash::FxBuildHasher;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A full store evicts `max_entries / EVICTION_BATCH_DIVISOR` entries at once.
const EVICTION_BATCH_DIVISOR: usize = 16;

struct CacheEntry {
    value: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process cache used when no external endpoint is configured.
///
/// Expired entries are dropped lazily on read and in bulk by
/// [`CacheStore::purge_expired`], which the purge job calls periodically.
pub struct MemoryCacheStore {
    entries: DashMap<String, CacheEntry, FxBuildHasher>,
    max_entries: usize,
}

impl MemoryCacheStore {
    pub fn new(max_entries: usize) -> Self {
        info!(max_entries, "Initializing in-memory response cache");
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sweep expired entries, then drop an arbitrary batch if still full.
    fn make_room(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        if self.entries.len() < self.max_entries {
            return;
        }

        let batch = (self.max_entries / EVICTION_BATCH_DIVISOR).max(1);
        let victims: Vec<String> = self
            .entries
            .iter()
            .take(batch)
            .map(|entry| entry.key().clone())
            .collect();
        for key in &victims {
            self.entries.remove(key);
        }
        debug!(evicted = victims.len(), "Evicted cache entries");
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, DomainError> {
        let now = Instant::now();
        match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }

        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), DomainError> {
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.make_room();
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, DomainError> {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before.saturating_sub(self.entries.len()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
