use async_trait::async_trait;
use ferrous_doh_domain::{DomainError, UpstreamSpec};
use hickory_proto::op::Message;

#[derive(Debug, Clone)]
pub struct DnsResolution {
    pub message: Message,
    /// Upstream that produced the answer.
    pub upstream: UpstreamSpec,
}

impl DnsResolution {
    pub fn new(message: Message, upstream: UpstreamSpec) -> Self {
        Self { message, upstream }
    }
}

#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Exchange `query` with an upstream and return the decoded response.
    async fn resolve(&self, query: &Message) -> Result<DnsResolution, DomainError>;
}
