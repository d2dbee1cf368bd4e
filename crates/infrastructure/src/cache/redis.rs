use async_trait::async_trait;
use bytes::Bytes;
use ferrous_doh_application::ports::CacheStore;
use ferrous_doh_domain::DomainError;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::info;

/// Cache backed by an external Redis-compatible server. Expiry is delegated
/// to the server via `SET .. EX`.
#[derive(Clone)]
pub struct RedisCacheStore {
    connection: ConnectionManager,
}

impl RedisCacheStore {
    pub async fn connect(endpoint: &str, timeout: Duration) -> Result<Self, DomainError> {
        let client = redis::Client::open(endpoint)
            .map_err(|e| DomainError::Cache(format!("invalid cache endpoint: {}", e)))?;

        let connection = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| DomainError::Cache(format!("timed out connecting to {}", endpoint)))?
            .map_err(|e| DomainError::Cache(format!("failed to connect to cache: {}", e)))?;

        info!(endpoint, "Connected to external response cache");
        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, DomainError> {
        let mut connection = self.connection.clone();
        let value: Option<Vec<u8>> = connection
            .get(key)
            .await
            .map_err(|e| DomainError::Cache(e.to_string()))?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), DomainError> {
        let mut connection = self.connection.clone();
        let _: () = connection
            .set_ex(key, value.as_ref(), ttl.as_secs().max(1))
            .await
            .map_err(|e| DomainError::Cache(e.to_string()))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
