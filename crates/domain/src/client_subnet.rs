use crate::DomainError;
use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

pub const DEFAULT_IPV4_PREFIX: u8 = 24;
pub const DEFAULT_IPV6_PREFIX: u8 = 56;

/// EDNS Client Subnet address family (RFC 7871 §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsFamily {
    Ipv4 = 1,
    Ipv6 = 2,
}

impl EcsFamily {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => EcsFamily::Ipv4,
            IpAddr::V6(_) => EcsFamily::Ipv6,
        }
    }

    pub fn code(&self) -> u16 {
        *self as u16
    }

    pub fn max_prefix(&self) -> u8 {
        match self {
            EcsFamily::Ipv4 => 32,
            EcsFamily::Ipv6 => 128,
        }
    }

    pub fn default_prefix(&self) -> u8 {
        match self {
            EcsFamily::Ipv4 => DEFAULT_IPV4_PREFIX,
            EcsFamily::Ipv6 => DEFAULT_IPV6_PREFIX,
        }
    }
}

/// Client subnet carried in the ECS option: an address masked to its source prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSubnet {
    address: IpAddr,
    source_prefix: u8,
}

impl ClientSubnet {
    pub fn new(address: IpAddr, source_prefix: u8) -> Result<Self, DomainError> {
        let address = normalize(address);
        let network = IpNetwork::new(address, source_prefix).map_err(|e| {
            DomainError::InvalidArgument {
                name: "edns_client_subnet",
                value: format!("{}/{} ({})", address, source_prefix, e),
            }
        })?;
        Ok(Self {
            address: network.network(),
            source_prefix,
        })
    }

    /// Subnet synthesized from the apparent client address: /24 or /56,
    /// or the full address length when `precise` is set.
    pub fn from_client_ip(ip: IpAddr, precise: bool) -> Self {
        let address = normalize(ip);
        let family = EcsFamily::of(&address);
        let prefix = if precise {
            family.max_prefix()
        } else {
            family.default_prefix()
        };
        let masked = IpNetwork::new(address, prefix)
            .map(|n| n.network())
            .unwrap_or(address);
        Self {
            address: masked,
            source_prefix: prefix,
        }
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn source_prefix(&self) -> u8 {
        self.source_prefix
    }

    pub fn family(&self) -> EcsFamily {
        EcsFamily::of(&self.address)
    }
}

fn normalize(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

impl fmt::Display for ClientSubnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.source_prefix)
    }
}

impl FromStr for ClientSubnet {
    type Err = DomainError;

    /// Parses an explicit `edns_client_subnet` value. `0/0` stands for
    /// `0.0.0.0/0`; a bare address takes its family's default prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidArgument {
            name: "edns_client_subnet",
            value: s.to_string(),
        };

        let value = if s == "0/0" { "0.0.0.0/0" } else { s };

        match value.split_once('/') {
            None => {
                let ip: IpAddr = value.parse().map_err(|_| invalid())?;
                let ip = normalize(ip);
                let prefix = EcsFamily::of(&ip).default_prefix();
                ClientSubnet::new(ip, prefix)
            }
            Some((addr, mask)) => {
                let ip: IpAddr = addr.parse().map_err(|_| invalid())?;
                let ip = normalize(ip);
                let prefix: u8 = mask.parse().map_err(|_| invalid())?;
                if prefix > EcsFamily::of(&ip).max_prefix() {
                    return Err(invalid());
                }
                ClientSubnet::new(ip, prefix)
            }
        }
    }
}
