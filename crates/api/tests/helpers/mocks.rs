use async_trait::async_trait;
use bytes::Bytes;
use ferrous_doh_application::ports::{CacheStore, DnsResolution, DnsResolver, IpClassifier};
use ferrous_doh_domain::{DomainError, UpstreamSpec};
use hickory_proto::op::{Edns, Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::opt::{ClientSubnet, EdnsCode, EdnsOption};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ANSWER_ADDR: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverMode {
    Answer,
    ServFail,
    Unreachable,
}

/// Answers every question with one A record (TTL 300) and echoes any ECS
/// option back with the scope set to the source prefix.
#[derive(Clone)]
pub struct MockDnsResolver {
    calls: Arc<AtomicU64>,
    mode: Arc<Mutex<ResolverMode>>,
    last_query: Arc<Mutex<Option<Message>>>,
}

impl MockDnsResolver {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicU64::new(0)),
            mode: Arc::new(Mutex::new(ResolverMode::Answer)),
            last_query: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_mode(&self, mode: ResolverMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<Message> {
        self.last_query.lock().unwrap().clone()
    }

    /// ECS option of the last forwarded query.
    pub fn last_subnet(&self) -> Option<ClientSubnet> {
        let query = self.last_query()?;
        match query.extensions().as_ref()?.option(EdnsCode::Subnet)? {
            EdnsOption::Subnet(subnet) => Some(subnet.clone()),
            _ => None,
        }
    }
}

fn respond(query: &Message, rcode: ResponseCode) -> Message {
    let mut response = Message::new();
    response
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_recursion_desired(query.recursion_desired())
        .set_recursion_available(true)
        .set_checking_disabled(query.checking_disabled())
        .set_response_code(rcode)
        .add_queries(query.queries().to_vec());

    if rcode == ResponseCode::NoError {
        if let Some(question) = query.queries().first() {
            response.add_answer(Record::from_rdata(
                question.name().clone(),
                300,
                RData::A(A::from(ANSWER_ADDR)),
            ));
        }
    }

    if let Some(EdnsOption::Subnet(subnet)) = query
        .extensions()
        .as_ref()
        .and_then(|edns| edns.option(EdnsCode::Subnet))
    {
        let mut edns = Edns::new();
        edns.options_mut().insert(EdnsOption::Subnet(ClientSubnet::new(
            subnet.addr(),
            subnet.source_prefix(),
            subnet.source_prefix(),
        )));
        *response.extensions_mut() = Some(edns);
    }

    response
}

#[async_trait]
impl DnsResolver for MockDnsResolver {
    async fn resolve(&self, query: &Message) -> Result<DnsResolution, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        let upstream: UpstreamSpec = "udp:192.0.2.53:53".parse().unwrap();
        let mode = *self.mode.lock().unwrap();
        match mode {
            ResolverMode::Answer => Ok(DnsResolution::new(
                respond(query, ResponseCode::NoError),
                upstream,
            )),
            ResolverMode::ServFail => Ok(DnsResolution::new(
                respond(query, ResponseCode::ServFail),
                upstream,
            )),
            ResolverMode::Unreachable => Err(DomainError::AllUpstreamsFailed(
                "Transport timeout connecting to 192.0.2.53:53".to_string(),
            )),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockCacheStore {
    entries: Arc<Mutex<HashMap<String, (Bytes, Duration)>>>,
}

impl MockCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, value: Bytes) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, Duration::from_secs(300)));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl CacheStore for MockCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, DomainError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| bytes.clone()))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), DomainError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, ttl));
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

/// Private ranges and loopback are non-global; everything else is global.
pub struct StaticIpClassifier;

impl IpClassifier for StaticIpClassifier {
    fn is_global(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => !(v4.is_private() || v4.is_loopback() || v4.is_unspecified()),
            IpAddr::V6(v6) => !(v6.is_loopback() || (v6.segments()[0] & 0xfe00) == 0xfc00),
        }
    }
}
