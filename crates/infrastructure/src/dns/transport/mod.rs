pub mod resolver;
pub mod tcp;
pub mod tls;
pub mod udp;

use async_trait::async_trait;
use ferrous_doh_domain::upstream::UpstreamAddr;
use ferrous_doh_domain::{DomainError, UpstreamSpec, UpstreamTransport};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

pub use tls::TlsSessionPool;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    Tls(tls::TlsTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tls(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
            Self::Tls(_) => "TLS",
        }
    }
}

/// Build the transport for `upstream`, resolving a hostname first if needed.
pub async fn create_transport(
    upstream: &UpstreamSpec,
    local_addr: Option<IpAddr>,
    timeout: Duration,
    tls_pool: &Arc<TlsSessionPool>,
) -> Result<Transport, DomainError> {
    let server_addr = match &upstream.addr {
        UpstreamAddr::Resolved(addr) => *addr,
        UpstreamAddr::Unresolved { hostname, port } => {
            resolver::resolve_first(hostname, *port, timeout).await?
        }
    };

    Ok(match upstream.transport {
        UpstreamTransport::Udp => Transport::Udp(udp::UdpTransport::new(server_addr, local_addr)),
        UpstreamTransport::Tcp => Transport::Tcp(tcp::TcpTransport::new(server_addr, local_addr)),
        UpstreamTransport::TcpTls => Transport::Tls(tls::TlsTransport::new(
            server_addr,
            upstream.host.to_string(),
            local_addr,
            Arc::clone(tls_pool),
        )),
    })
}

/// Ephemeral bind address matching the server's family.
pub(crate) fn bind_addr(server_addr: &SocketAddr, local_addr: Option<IpAddr>) -> SocketAddr {
    match local_addr {
        Some(ip) => SocketAddr::new(ip, 0),
        None if server_addr.is_ipv4() => SocketAddr::from(([0, 0, 0, 0], 0)),
        None => SocketAddr::from(([0u16; 8], 0)),
    }
}

pub(crate) fn io_error(server: &SocketAddr, reason: impl std::fmt::Display) -> DomainError {
    DomainError::TransportIo {
        server: server.to_string(),
        reason: reason.to_string(),
    }
}
