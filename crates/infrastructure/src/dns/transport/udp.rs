//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is (no framing). Responses are read into a 4096-byte
//! buffer, matching the payload size advertised in the OPT record. A
//! truncated (TC) response is returned to the caller, which retries via TCP.

use super::{bind_addr, io_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use ferrous_doh_domain::DomainError;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP transport
pub struct UdpTransport {
    server_addr: SocketAddr,
    local_addr: Option<IpAddr>,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr, local_addr: Option<IpAddr>) -> Self {
        Self {
            server_addr,
            local_addr,
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let socket = UdpSocket::bind(bind_addr(&self.server_addr, self.local_addr))
            .await
            .map_err(|e| io_error(&self.server_addr, format!("failed to bind UDP socket: {}", e)))?;

        socket
            .connect(self.server_addr)
            .await
            .map_err(|e| io_error(&self.server_addr, e))?;

        let exchange = async {
            let bytes_sent = socket.send(message_bytes).await?;
            debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

            let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
            let bytes_received = socket.recv(&mut recv_buf).await?;
            recv_buf.truncate(bytes_received);
            Ok::<_, std::io::Error>(recv_buf)
        };

        let recv_buf = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::ConnectionRefused => DomainError::TransportConnectionRefused {
                    server: self.server_addr.to_string(),
                },
                _ => io_error(&self.server_addr, e),
            })?;

        if recv_buf.len() < 12 {
            warn!(
                server = %self.server_addr,
                len = recv_buf.len(),
                "UDP response shorter than a DNS header"
            );
        }

        debug!(
            server = %self.server_addr,
            bytes_received = recv_buf.len(),
            "UDP response received"
        );

        Ok(TransportResponse {
            bytes: recv_buf,
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
