use ferrous_doh_application::ports::IpClassifier;
use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use std::net::IpAddr;
use std::sync::LazyLock;

/// IPv4 ranges that are not globally reachable (RFC 6890 special-purpose registry).
const NON_GLOBAL_V4: &[(&str, u8)] = &[
    ("0.0.0.0", 8),
    ("10.0.0.0", 8),
    ("100.64.0.0", 10),
    ("127.0.0.0", 8),
    ("169.254.0.0", 16),
    ("172.16.0.0", 12),
    ("192.0.0.0", 29),
    ("192.88.99.0", 24),
    ("192.168.0.0", 16),
    ("240.0.0.0", 4),
];

const NON_GLOBAL_V6: &[(&str, u8)] = &[
    ("::", 127),
    ("100::", 64),
    ("fc00::", 7),
    ("fe80::", 10),
];

static NON_GLOBAL: LazyLock<Vec<IpNetwork>> = LazyLock::new(|| {
    let v4 = NON_GLOBAL_V4.iter().filter_map(|(addr, prefix)| {
        let addr = addr.parse().ok()?;
        Ipv4Network::new(addr, *prefix).ok().map(IpNetwork::V4)
    });
    let v6 = NON_GLOBAL_V6.iter().filter_map(|(addr, prefix)| {
        let addr = addr.parse().ok()?;
        Ipv6Network::new(addr, *prefix).ok().map(IpNetwork::V6)
    });
    v4.chain(v6).collect()
});

/// Classifies client addresses against the special-purpose range table.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalIpClassifier;

impl GlobalIpClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl IpClassifier for GlobalIpClassifier {
    fn is_global(&self, ip: IpAddr) -> bool {
        let ip = match ip {
            IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
            v4 => v4,
        };
        !NON_GLOBAL.iter().any(|net| net.contains(ip))
    }
}
