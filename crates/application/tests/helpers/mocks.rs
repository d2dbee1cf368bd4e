use async_trait::async_trait;
use bytes::Bytes;
use ferrous_doh_application::ports::{CacheStore, DnsResolution, DnsResolver, IpClassifier};
use ferrous_doh_domain::{DomainError, UpstreamSpec};
use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn upstream() -> UpstreamSpec {
    "udp:192.0.2.53:53".parse().unwrap()
}

/// Response to `query` carrying one A record per address.
pub fn a_response(query: &Message, addresses: &[Ipv4Addr], ttl: u32) -> Message {
    let mut response = Message::new();
    response
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_recursion_desired(query.recursion_desired())
        .set_recursion_available(true)
        .add_queries(query.queries().to_vec());

    if let Some(question) = query.queries().first() {
        for addr in addresses {
            response.add_answer(Record::from_rdata(
                question.name().clone(),
                ttl,
                RData::A(A::from(*addr)),
            ));
        }
    }
    response
}

#[derive(Clone)]
pub struct MockDnsResolver {
    calls: Arc<AtomicU64>,
    should_fail: Arc<AtomicBool>,
    answer: Arc<Mutex<Vec<Ipv4Addr>>>,
    resolved: Arc<Notify>,
}

impl MockDnsResolver {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicU64::new(0)),
            should_fail: Arc::new(AtomicBool::new(false)),
            answer: Arc::new(Mutex::new(vec![Ipv4Addr::new(93, 184, 216, 34)])),
            resolved: Arc::new(Notify::new()),
        }
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_answer(&self, addresses: Vec<Ipv4Addr>) {
        *self.answer.lock().unwrap() = addresses;
    }

    /// Completes after the next `resolve` call returns.
    pub async fn wait_for_resolve(&self) {
        self.resolved.notified().await;
    }
}

#[async_trait]
impl DnsResolver for MockDnsResolver {
    async fn resolve(&self, query: &Message) -> Result<DnsResolution, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let result = if self.should_fail.load(Ordering::SeqCst) {
            Err(DomainError::AllUpstreamsFailed(
                "Transport timeout connecting to udp:192.0.2.53:53".to_string(),
            ))
        } else {
            let answer = self.answer.lock().unwrap().clone();
            Ok(DnsResolution::new(a_response(query, &answer, 300), upstream()))
        };

        self.resolved.notify_one();
        result
    }
}

#[derive(Clone, Default)]
pub struct MockCacheStore {
    entries: Arc<Mutex<HashMap<String, (Bytes, Duration)>>>,
    sets: Arc<AtomicU64>,
    should_fail: Arc<AtomicBool>,
}

impl MockCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
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

    pub fn set_count(&self) -> u64 {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for MockCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, DomainError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::Cache("connection refused".to_string()));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| bytes.clone()))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), DomainError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::Cache("connection refused".to_string()));
        }
        self.sets.fetch_add(1, Ordering::SeqCst);
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

/// Treats 10/8, 172.16/12, 192.168/16, loopback and fc00::/7 as non-global.
pub struct StaticIpClassifier;

impl IpClassifier for StaticIpClassifier {
    fn is_global(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => !(v4.is_private() || v4.is_loopback()),
            IpAddr::V6(v6) => !(v6.is_loopback() || (v6.segments()[0] & 0xfe00) == 0xfc00),
        }
    }
}
