use crate::dns::transport::{self, TlsSessionPool, TransportResponse};
use async_trait::async_trait;
use ferrous_doh_domain::{DomainError, UpstreamSpec};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// One wire-level round trip with a single upstream.
#[async_trait]
pub trait UpstreamExchange: Send + Sync {
    async fn exchange(
        &self,
        upstream: &UpstreamSpec,
        query: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;
}

/// Sends over the real network using the transport named by the upstream
/// tag. DoT sessions are reused through the shared pool.
#[derive(Default, Clone)]
pub struct NetworkExchange {
    local_addr: Option<IpAddr>,
    tls_pool: Arc<TlsSessionPool>,
}

impl NetworkExchange {
    pub fn new(local_addr: Option<IpAddr>) -> Self {
        Self {
            local_addr,
            tls_pool: Arc::new(TlsSessionPool::default()),
        }
    }
}

#[async_trait]
impl UpstreamExchange for NetworkExchange {
    async fn exchange(
        &self,
        upstream: &UpstreamSpec,
        query: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let exchange = async {
            let transport =
                transport::create_transport(upstream, self.local_addr, timeout, &self.tls_pool)
                    .await?;
            transport.send(query, timeout).await
        };

        // The transports time out each phase; this bounds the whole exchange.
        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: upstream.to_string(),
            })?
    }
}
