use std::net::IpAddr;

pub trait IpClassifier: Send + Sync {
    /// True when `ip` is globally routable (not private, loopback, link-local, ...).
    fn is_global(&self, ip: IpAddr) -> bool;
}
