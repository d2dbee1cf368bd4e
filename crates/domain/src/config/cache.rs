use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    /// External cache endpoint (`redis://host:port`). Empty means in-memory.
    pub endpoint: Option<String>,

    pub fresh_ttl: u64,

    pub stale_ttl: u64,

    pub max_entries: usize,

    /// Seconds between sweeps of expired in-memory entries.
    pub purge_interval: u64,
}

impl CacheConfig {
    pub fn fresh_ttl(&self) -> Duration {
        Duration::from_secs(self.fresh_ttl)
    }

    pub fn stale_ttl(&self) -> Duration {
        Duration::from_secs(self.stale_ttl)
    }

    pub fn external_endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|e| !e.is_empty())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            fresh_ttl: 300,
            stale_ttl: 600,
            max_entries: 100_000,
            purge_interval: 60,
        }
    }
}
