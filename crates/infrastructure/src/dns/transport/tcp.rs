use super::{bind_addr, io_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use ferrous_doh_domain::DomainError;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpSocket, TcpStream};
use tracing::debug;

/// DNS over TCP transport (RFC 1035 §4.2.2, two-byte length framing).
pub struct TcpTransport {
    server_addr: SocketAddr,
    local_addr: Option<IpAddr>,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr, local_addr: Option<IpAddr>) -> Self {
        Self {
            server_addr,
            local_addr,
        }
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let mut stream = connect_tcp(self.server_addr, self.local_addr, timeout).await?;

        tokio::time::timeout(timeout, send_with_length_prefix(&mut stream, message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })?
            .map_err(|e| io_error(&self.server_addr, e))?;

        debug!(
            server = %self.server_addr,
            message_len = message_bytes.len(),
            "TCP query sent"
        );

        let response_bytes = tokio::time::timeout(timeout, read_with_length_prefix(&mut stream))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })?
            .map_err(|e| io_error(&self.server_addr, e))?;

        debug!(
            server = %self.server_addr,
            response_len = response_bytes.len(),
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes: response_bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

/// Opens a TCP connection, binding to `local_addr` when one is configured.
pub(crate) async fn connect_tcp(
    server_addr: SocketAddr,
    local_addr: Option<IpAddr>,
    timeout: Duration,
) -> Result<TcpStream, DomainError> {
    let socket = if server_addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(|e| io_error(&server_addr, e))?;

    if local_addr.is_some() {
        socket
            .bind(bind_addr(&server_addr, local_addr))
            .map_err(|e| io_error(&server_addr, format!("failed to bind {}", e)))?;
    }

    let stream = tokio::time::timeout(timeout, socket.connect(server_addr))
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: server_addr.to_string(),
        })?
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::ConnectionRefused => DomainError::TransportConnectionRefused {
                server: server_addr.to_string(),
            },
            _ => io_error(&server_addr, e),
        })?;

    stream
        .set_nodelay(true)
        .map_err(|e| io_error(&server_addr, format!("failed to set TCP_NODELAY: {}", e)))?;

    Ok(stream)
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> std::io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "DNS message exceeds 65535 bytes",
        )
    })?;

    stream.write_all(&length.to_be_bytes()).await?;
    stream.write_all(message_bytes).await?;
    stream.flush().await
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> std::io::Result<Vec<u8>>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;

    let response_len = u16::from_be_bytes(len_buf) as usize;

    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await?;
    Ok(response)
}
