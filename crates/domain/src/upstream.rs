use crate::DomainError;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

/// Transport used to reach an upstream resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamTransport {
    Udp,
    Tcp,
    TcpTls,
}

impl UpstreamTransport {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamTransport::Udp => "udp",
            UpstreamTransport::Tcp => "tcp",
            UpstreamTransport::TcpTls => "tcp-tls",
        }
    }
}

impl fmt::Display for UpstreamTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpstreamTransport {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "udp" => Ok(UpstreamTransport::Udp),
            "tcp" => Ok(UpstreamTransport::Tcp),
            "tcp-tls" => Ok(UpstreamTransport::TcpTls),
            other => Err(DomainError::ConfigError(format!(
                "unknown upstream transport \"{}\"",
                other
            ))),
        }
    }
}

/// Represents an upstream server address that may or may not be resolved to an IP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl UpstreamAddr {
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            UpstreamAddr::Resolved(addr) => Some(*addr),
            UpstreamAddr::Unresolved { .. } => None,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            UpstreamAddr::Resolved(addr) => addr.port(),
            UpstreamAddr::Unresolved { port, .. } => *port,
        }
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamAddr::Resolved(addr) => write!(f, "{}", addr),
            UpstreamAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

/// One entry of the upstream pool, written as `transport:host:port`.
///
/// Parsed once when the configuration is loaded, so a bad transport tag is
/// rejected up front instead of on every query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpstreamSpec {
    pub transport: UpstreamTransport,
    pub addr: UpstreamAddr,
    /// Host as written, without brackets. Used as the TLS server name.
    pub host: Arc<str>,
}

impl UpstreamSpec {
    pub fn new(transport: UpstreamTransport, addr: UpstreamAddr, host: impl Into<Arc<str>>) -> Self {
        Self {
            transport,
            addr,
            host: host.into(),
        }
    }

    /// Same endpoint reached over another transport (TCP fallback after truncation).
    pub fn with_transport(&self, transport: UpstreamTransport) -> Self {
        Self {
            transport,
            addr: self.addr.clone(),
            host: self.host.clone(),
        }
    }
}

impl fmt::Display for UpstreamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.transport, self.addr)
    }
}

fn parse_host_port(s: &str) -> Option<(&str, u16)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let port_str = s[end + 1..].strip_prefix(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    } else {
        let (host, port_str) = s.rsplit_once(':')?;
        if host.is_empty() || host.contains(':') {
            return None;
        }
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    }
}

impl FromStr for UpstreamSpec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (tag, rest) = s.split_once(':').ok_or_else(|| {
            DomainError::ConfigError(format!(
                "invalid upstream \"{}\", expected transport:host:port",
                s
            ))
        })?;
        let transport: UpstreamTransport = tag.parse()?;

        let (host, port) = parse_host_port(rest).ok_or_else(|| {
            DomainError::ConfigError(format!("invalid upstream address \"{}\"", rest))
        })?;

        let addr = match host.parse::<std::net::IpAddr>() {
            Ok(ip) => UpstreamAddr::Resolved(SocketAddr::new(ip, port)),
            Err(_) => UpstreamAddr::Unresolved {
                hostname: host.into(),
                port,
            },
        };

        Ok(UpstreamSpec::new(transport, addr, host))
    }
}
