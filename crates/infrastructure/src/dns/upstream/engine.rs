use super::exchange::{NetworkExchange, UpstreamExchange};
use super::selector::{RandomSelector, UpstreamSelector};
use async_trait::async_trait;
use ferrous_doh_application::ports::{DnsResolution, DnsResolver};
use ferrous_doh_domain::config::UpstreamConfig;
use ferrous_doh_domain::{DomainError, UpstreamSpec, UpstreamTransport};
use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Forwards queries to a randomly chosen member of the upstream pool,
/// retrying up to `tries` times.
pub struct UpstreamResolver {
    pool: Arc<[UpstreamSpec]>,
    tries: u32,
    timeout: Duration,
    selector: Arc<dyn UpstreamSelector>,
    exchange: Arc<dyn UpstreamExchange>,
}

impl UpstreamResolver {
    pub fn new(
        pool: Vec<UpstreamSpec>,
        tries: u32,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        if pool.is_empty() {
            return Err(DomainError::ConfigError(
                "upstream pool must not be empty".to_string(),
            ));
        }
        if tries == 0 {
            return Err(DomainError::ConfigError(
                "upstream tries must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            pool: pool.into(),
            tries,
            timeout,
            selector: Arc::new(RandomSelector),
            exchange: Arc::new(NetworkExchange::default()),
        })
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, DomainError> {
        let resolver = Self::new(config.parse_servers()?, config.tries, config.timeout_duration())?;
        Ok(resolver.with_exchange(Arc::new(NetworkExchange::new(config.local_addr))))
    }

    pub fn with_selector(mut self, selector: Arc<dyn UpstreamSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_exchange(mut self, exchange: Arc<dyn UpstreamExchange>) -> Self {
        self.exchange = exchange;
        self
    }

    pub fn pool(&self) -> &[UpstreamSpec] {
        &self.pool
    }

    async fn attempt(
        &self,
        upstream: &UpstreamSpec,
        query_id: u16,
        query_bytes: &[u8],
        zone_transfer: bool,
    ) -> Result<Message, DomainError> {
        let first = if zone_transfer && upstream.transport == UpstreamTransport::Udp {
            upstream.with_transport(UpstreamTransport::Tcp)
        } else {
            upstream.clone()
        };

        let response = self.exchange_once(&first, query_id, query_bytes).await?;

        if response.truncated() && first.transport == UpstreamTransport::Udp {
            debug!(upstream = %first, "Truncated UDP response, retrying over TCP");
            let tcp = first.with_transport(UpstreamTransport::Tcp);
            return self.exchange_once(&tcp, query_id, query_bytes).await;
        }

        Ok(response)
    }

    async fn exchange_once(
        &self,
        upstream: &UpstreamSpec,
        query_id: u16,
        query_bytes: &[u8],
    ) -> Result<Message, DomainError> {
        let raw = self
            .exchange
            .exchange(upstream, query_bytes, self.timeout)
            .await?;

        let response = Message::from_vec(&raw.bytes).map_err(|e| DomainError::InvalidDnsResponse {
            server: upstream.to_string(),
            reason: e.to_string(),
        })?;

        if response.id() != query_id {
            return Err(DomainError::InvalidDnsResponse {
                server: upstream.to_string(),
                reason: format!(
                    "response id {} does not match query id {}",
                    response.id(),
                    query_id
                ),
            });
        }

        debug!(
            upstream = %upstream,
            protocol = raw.protocol_used,
            rcode = %response.response_code(),
            answers = response.answers().len(),
            "Upstream answered"
        );

        Ok(response)
    }
}

#[async_trait]
impl DnsResolver for UpstreamResolver {
    async fn resolve(&self, query: &Message) -> Result<DnsResolution, DomainError> {
        let query_bytes = query
            .to_vec()
            .map_err(|e| DomainError::Serialization(e.to_string()))?;
        let zone_transfer = query
            .queries()
            .first()
            .is_some_and(|q| q.query_type() == RecordType::AXFR);

        let mut last_error = None;
        for attempt in 1..=self.tries {
            let upstream = self.selector.select(&self.pool);
            match self
                .attempt(upstream, query.id(), &query_bytes, zone_transfer)
                .await
            {
                Ok(message) => return Ok(DnsResolution::new(message, upstream.clone())),
                Err(e) => {
                    warn!(upstream = %upstream, attempt, error = %e, "DNS upstream query failed");
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        Err(DomainError::AllUpstreamsFailed(reason))
    }
}
