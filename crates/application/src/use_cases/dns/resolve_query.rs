use crate::dns::DnsTransaction;
use crate::ports::{CacheStore, DnsResolver};
use bytes::Bytes;
use ferrous_doh_domain::config::CacheConfig;
use ferrous_doh_domain::{CacheKey, DomainError};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Lifetimes of the two cache tiers. Stale entries outlive fresh ones and
/// are served while a background refresh runs.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub fresh_ttl: Duration,
    pub stale_ttl: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            fresh_ttl: Duration::from_secs(300),
            stale_ttl: Duration::from_secs(600),
        }
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            fresh_ttl: config.fresh_ttl(),
            stale_ttl: config.stale_ttl(),
        }
    }
}

pub struct ResolveQueryUseCase {
    resolver: Arc<dyn DnsResolver>,
    cache: Option<Arc<dyn CacheStore>>,
    policy: CachePolicy,
}

impl ResolveQueryUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self {
            resolver,
            cache: None,
            policy: CachePolicy::default(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>, policy: CachePolicy) -> Self {
        self.cache = Some(cache);
        self.policy = policy;
        self
    }

    /// Fill `txn` with a response: fresh tier, then stale tier (plus a
    /// background refresh), then the upstream pool.
    pub async fn execute(&self, txn: &mut DnsTransaction) -> Result<(), DomainError> {
        let key = cache_key_for(&txn.request)?;

        if let Some(cache) = &self.cache {
            if let Some(message) = lookup(cache.as_ref(), key.fresh()).await {
                debug!(key = %key, "Cache HIT");
                txn.complete(message, None, true);
                return Ok(());
            }

            if let Some(message) = lookup(cache.as_ref(), &key.stale()).await {
                debug!(key = %key, "Stale cache HIT, refreshing in background");
                self.spawn_refresh(Arc::clone(cache), txn.request.clone(), key);
                txn.complete(message, None, true);
                return Ok(());
            }
        }

        let resolution = self.resolver.resolve(&txn.request).await?;

        if let Some(cache) = &self.cache {
            store(cache.as_ref(), &key, &resolution.message, self.policy).await;
        }

        txn.complete(resolution.message, Some(resolution.upstream), false);
        Ok(())
    }

    fn spawn_refresh(&self, cache: Arc<dyn CacheStore>, query: Message, key: CacheKey) {
        let resolver = Arc::clone(&self.resolver);
        let policy = self.policy;

        tokio::spawn(async move {
            match resolver.resolve(&query).await {
                Ok(resolution) => {
                    store(cache.as_ref(), &key, &resolution.message, policy).await;
                    debug!(key = %key, upstream = %resolution.upstream, "Background refresh completed");
                }
                Err(e) => {
                    debug!(key = %key, error = %e, "Background refresh failed");
                }
            }
        });
    }
}

fn cache_key_for(query: &Message) -> Result<CacheKey, DomainError> {
    let question = query.queries().first().ok_or(DomainError::NoQuestion)?;
    Ok(CacheKey::new(
        &question.name().to_ascii(),
        u16::from(question.query_type()),
    ))
}

async fn lookup(cache: &dyn CacheStore, key: &str) -> Option<Message> {
    let bytes = match cache.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            debug!(key, error = %e, "Cache lookup failed");
            return None;
        }
    };

    match Message::from_vec(&bytes) {
        Ok(message) => Some(message),
        Err(e) => {
            debug!(key, error = %e, "Discarding undecodable cache entry");
            None
        }
    }
}

/// Write both tiers, but only for answer-bearing responses.
async fn store(cache: &dyn CacheStore, key: &CacheKey, response: &Message, policy: CachePolicy) {
    if response.answers().is_empty() {
        return;
    }

    let bytes = match response.to_vec() {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            debug!(key = %key, error = %e, "Failed to encode response for cache");
            return;
        }
    };

    if let Err(e) = cache.set(key.fresh(), bytes.clone(), policy.fresh_ttl).await {
        debug!(key = %key, error = %e, "Failed to write fresh cache entry");
    }
    if let Err(e) = cache.set(&key.stale(), bytes, policy.stale_ttl).await {
        debug!(key = %key, error = %e, "Failed to write stale cache entry");
    }
}
