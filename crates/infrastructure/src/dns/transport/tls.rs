//! DNS over TLS (RFC 7858).
//!
//! Connections that complete an exchange are parked in a [`TlsSessionPool`]
//! keyed by server address and TLS name, and reused by the next query to the
//! same upstream.

use super::tcp::{connect_tcp, read_with_length_prefix, send_with_length_prefix};
use super::{io_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use dashmap::DashMap;
use ferrous_doh_domain::DomainError;
use rustls::pki_types::ServerName;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

const DEFAULT_MAX_IDLE: usize = 2;

static CLIENT_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    let roots = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    Arc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
});

type PoolKey = (SocketAddr, String);

/// Idle DoT connections, at most `max_idle` per upstream.
pub struct TlsSessionPool {
    idle: DashMap<PoolKey, Vec<TlsStream<TcpStream>>>,
    max_idle: usize,
}

impl TlsSessionPool {
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: DashMap::new(),
            max_idle,
        }
    }

    fn checkout(&self, key: &PoolKey) -> Option<TlsStream<TcpStream>> {
        self.idle.get_mut(key)?.pop()
    }

    fn checkin(&self, key: PoolKey, stream: TlsStream<TcpStream>) {
        let mut streams = self.idle.entry(key).or_default();
        if streams.len() < self.max_idle {
            streams.push(stream);
        }
    }

    /// Idle connections across all upstreams.
    pub fn idle_count(&self) -> usize {
        self.idle.iter().map(|entry| entry.value().len()).sum()
    }
}

impl Default for TlsSessionPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

pub struct TlsTransport {
    server_addr: SocketAddr,
    server_name: String,
    local_addr: Option<IpAddr>,
    pool: Arc<TlsSessionPool>,
}

impl TlsTransport {
    pub fn new(
        server_addr: SocketAddr,
        server_name: String,
        local_addr: Option<IpAddr>,
        pool: Arc<TlsSessionPool>,
    ) -> Self {
        Self {
            server_addr,
            server_name,
            local_addr,
            pool,
        }
    }

    fn pool_key(&self) -> PoolKey {
        (self.server_addr, self.server_name.clone())
    }

    async fn handshake(&self, timeout: Duration) -> Result<TlsStream<TcpStream>, DomainError> {
        let name = ServerName::try_from(self.server_name.clone()).map_err(|e| {
            io_error(
                &self.server_addr,
                format!("invalid TLS name '{}': {}", self.server_name, e),
            )
        })?;

        let tcp = connect_tcp(self.server_addr, self.local_addr, timeout).await?;
        let connector = TlsConnector::from(Arc::clone(&CLIENT_CONFIG));

        let stream = tokio::time::timeout(timeout, connector.connect(name, tcp))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })?
            .map_err(|e| io_error(&self.server_addr, format!("TLS handshake failed: {}", e)))?;

        debug!(server = %self.server_addr, name = %self.server_name, "TLS session established");
        Ok(stream)
    }

    async fn round_trip(
        &self,
        stream: &mut TlsStream<TcpStream>,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, DomainError> {
        let exchange = async {
            send_with_length_prefix(stream, message_bytes).await?;
            read_with_length_prefix(stream).await
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })?
            .map_err(|e| io_error(&self.server_addr, e))
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let key = self.pool_key();

        let (stream, bytes) = match self.pool.checkout(&key) {
            Some(mut idle) => match self.round_trip(&mut idle, message_bytes, timeout).await {
                Ok(bytes) => (idle, bytes),
                Err(e) => {
                    debug!(server = %self.server_addr, error = %e, "Idle TLS session unusable, reconnecting");
                    let mut fresh = self.handshake(timeout).await?;
                    let bytes = self.round_trip(&mut fresh, message_bytes, timeout).await?;
                    (fresh, bytes)
                }
            },
            None => {
                let mut fresh = self.handshake(timeout).await?;
                let bytes = self.round_trip(&mut fresh, message_bytes, timeout).await?;
                (fresh, bytes)
            }
        };

        debug!(server = %self.server_addr, response_len = bytes.len(), "TLS response received");
        self.pool.checkin(key, stream);

        Ok(TransportResponse {
            bytes,
            protocol_used: "TLS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TLS"
    }
}
