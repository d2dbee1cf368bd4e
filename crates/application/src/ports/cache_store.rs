use async_trait::async_trait;
use bytes::Bytes;
use ferrous_doh_domain::DomainError;
use std::time::Duration;

/// Key/value store for wire-format responses with per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, DomainError>;

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), DomainError>;

    /// Drop expired entries. Stores with native expiry return 0.
    async fn purge_expired(&self) -> Result<usize, DomainError> {
        Ok(0)
    }

    fn backend_name(&self) -> &'static str;
}
