use crate::{DomainError, UpstreamSpec};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Pool entries written as `transport:host:port`.
    pub servers: Vec<String>,

    /// Per-attempt timeout in seconds.
    pub timeout: u64,

    pub tries: u32,

    /// Source address for outgoing upstream sockets.
    pub local_addr: Option<IpAddr>,
}

impl UpstreamConfig {
    pub fn parse_servers(&self) -> Result<Vec<UpstreamSpec>, DomainError> {
        self.servers.iter().map(|s| s.parse()).collect()
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            servers: vec!["udp:8.8.8.8:53".to_string()],
            timeout: 10,
            tries: 3,
            local_addr: None,
        }
    }
}
