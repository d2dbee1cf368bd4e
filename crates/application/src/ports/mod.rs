mod cache_store;
mod dns_resolver;
mod ip_classifier;

pub use cache_store::CacheStore;
pub use dns_resolver::{DnsResolution, DnsResolver};
pub use ip_classifier::IpClassifier;
