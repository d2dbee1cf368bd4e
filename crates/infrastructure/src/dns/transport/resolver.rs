use ferrous_doh_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;

/// Resolves an upstream hostname through the system resolver and returns
/// the first address.
pub async fn resolve_first(
    hostname: &str,
    port: u16,
    timeout: Duration,
) -> Result<SocketAddr, DomainError> {
    let target = format!("{}:{}", hostname, port);

    let mut addrs = tokio::time::timeout(timeout, tokio::net::lookup_host((hostname, port)))
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: target.clone(),
        })?
        .map_err(|e| DomainError::TransportIo {
            server: target.clone(),
            reason: format!("name resolution failed: {}", e),
        })?;

    addrs.next().ok_or_else(|| DomainError::TransportIo {
        server: target,
        reason: "no addresses found".to_string(),
    })
}
