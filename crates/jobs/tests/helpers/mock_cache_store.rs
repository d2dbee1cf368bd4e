use async_trait::async_trait;
use bytes::Bytes;
use ferrous_doh_application::ports::CacheStore;
use ferrous_doh_domain::DomainError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Counts purge calls; every purge reports `removed_per_purge` entries.
pub struct MockPurgeStore {
    purge_calls: AtomicUsize,
    removed_per_purge: usize,
    should_fail: AtomicBool,
}

impl MockPurgeStore {
    pub fn new() -> Self {
        Self {
            purge_calls: AtomicUsize::new(0),
            removed_per_purge: 3,
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn purge_call_count(&self) -> usize {
        self.purge_calls.load(Ordering::SeqCst)
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStore for MockPurgeStore {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, DomainError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<(), DomainError> {
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, DomainError> {
        self.purge_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::Cache("mock purge failure".to_string()));
        }
        Ok(self.removed_per_purge)
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}
