use ferrous_doh_domain::config::EcsConfig;
use ferrous_doh_domain::ClientSubnet;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::info;

use crate::ports::IpClassifier;

/// Request-derived hints about who the client is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientHints<'a> {
    pub no_ecs: bool,
    pub forwarded_for: Option<&'a str>,
    pub real_ip: Option<&'a str>,
    pub remote: Option<IpAddr>,
}

/// Picks the address used to synthesize EDNS Client Subnet data.
pub struct ClientAddressResolver {
    classifier: Arc<dyn IpClassifier>,
    allow_non_global: bool,
    use_precise_ip: bool,
    log_guessed_ip: bool,
}

impl ClientAddressResolver {
    pub fn new(classifier: Arc<dyn IpClassifier>, ecs: &EcsConfig, log_guessed_ip: bool) -> Self {
        Self {
            classifier,
            allow_non_global: ecs.allow_non_global_ip,
            use_precise_ip: ecs.use_precise_ip,
            log_guessed_ip,
        }
    }

    /// Priority: `no_ecs`, then the first global `X-Forwarded-For` entry,
    /// then `X-Real-IP`, then the TCP peer. The last two must be global
    /// unless non-global addresses are allowed.
    pub fn find_client_ip(&self, hints: &ClientHints<'_>) -> Option<IpAddr> {
        if hints.no_ecs {
            return None;
        }

        if let Some(forwarded) = hints.forwarded_for {
            let global = forwarded
                .split(',')
                .filter_map(|addr| addr.trim().parse::<IpAddr>().ok())
                .find(|ip| self.classifier.is_global(*ip));
            if global.is_some() {
                return global;
            }
        }

        if let Some(ip) = hints
            .real_ip
            .and_then(|value| value.trim().parse::<IpAddr>().ok())
        {
            if self.acceptable(ip) {
                return Some(ip);
            }
        }

        hints.remote.filter(|ip| self.acceptable(*ip))
    }

    /// Subnet to attach to a query that has no client-supplied ECS.
    pub fn synthesize(&self, hints: &ClientHints<'_>) -> Option<ClientSubnet> {
        let ip = self.find_client_ip(hints)?;
        let subnet = ClientSubnet::from_client_ip(ip, self.use_precise_ip);
        if self.log_guessed_ip {
            info!(client_ip = %ip, subnet = %subnet, "Guessed client address");
        }
        Some(subnet)
    }

    fn acceptable(&self, ip: IpAddr) -> bool {
        self.allow_non_global || self.classifier.is_global(ip)
    }
}
