use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid argument value: \"{name}\" = \"{value}\"")]
    InvalidArgument { name: &'static str, value: String },

    #[error("Invalid argument value: \"name\" = \"{name}\" ({reason})")]
    InvalidQueryName { name: String, reason: String },

    #[error("Invalid argument value: \"ct\" = \"{0}\"")]
    UnsupportedContentType(String),

    #[error("DNS packet parse failure ({0})")]
    MalformedPacket(String),

    #[error("DNS query has no question")]
    NoQuestion,

    #[error("Transport timeout connecting to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("Transport error with {server}: {reason}")]
    TransportIo { server: String, reason: String },

    #[error("Invalid DNS response from {server}: {reason}")]
    InvalidDnsResponse { server: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("all upstream servers failed: {0}")]
    AllUpstreamsFailed(String),

    #[error("DNS packet parse failure ({0})")]
    Serialization(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl DomainError {
    /// Client input errors are answered with a 4xx and never retried.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidArgument { .. }
                | DomainError::InvalidQueryName { .. }
                | DomainError::UnsupportedContentType(_)
                | DomainError::MalformedPacket(_)
                | DomainError::NoQuestion
        )
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DomainError::TransportTimeout { .. }
                | DomainError::TransportConnectionRefused { .. }
                | DomainError::TransportIo { .. }
                | DomainError::InvalidDnsResponse { .. }
        )
    }
}
