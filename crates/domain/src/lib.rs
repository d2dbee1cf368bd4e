//! Ferrous DoH Domain Layer
pub mod cache_key;
pub mod client_subnet;
pub mod config;
pub mod errors;
pub mod upstream;
pub mod wire_format;

pub use cache_key::CacheKey;
pub use client_subnet::{ClientSubnet, EcsFamily};
pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use upstream::{UpstreamSpec, UpstreamTransport};
pub use wire_format::WireFormat;
