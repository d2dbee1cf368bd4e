#![allow(dead_code)]

mod mocks;

pub use mocks::*;

use axum::{body::Body, extract::connect_info::MockConnectInfo, http::Request, Router};
use ferrous_doh_api::{create_doh_routes, AppState};
use ferrous_doh_application::ports::{CacheStore, DnsResolver};
use ferrous_doh_application::services::ClientAddressResolver;
use ferrous_doh_application::use_cases::{CachePolicy, ResolveQueryUseCase};
use ferrous_doh_domain::config::EcsConfig;
use http_body_util::BodyExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

pub const DOH_PATH: &str = "/dns-query";

pub struct TestApp {
    pub router: Router,
    pub resolver: MockDnsResolver,
    pub cache: MockCacheStore,
}

impl TestApp {
    /// Peer address is a global unicast address unless overridden.
    pub fn new() -> Self {
        Self::with_remote("198.51.100.7:40000".parse().unwrap())
    }

    pub fn with_remote(remote: SocketAddr) -> Self {
        let resolver = MockDnsResolver::new();
        let cache = MockCacheStore::new();

        let resolve_query = ResolveQueryUseCase::new(Arc::new(resolver.clone()) as Arc<dyn DnsResolver>)
            .with_cache(
                Arc::new(cache.clone()) as Arc<dyn CacheStore>,
                CachePolicy::default(),
            );

        let state = AppState {
            resolve_query: Arc::new(resolve_query),
            client_addresses: Arc::new(ClientAddressResolver::new(
                Arc::new(StaticIpClassifier),
                &EcsConfig::default(),
                false,
            )),
            debug_headers: Arc::from(vec!["User-Agent".to_string()]),
        };

        let router = create_doh_routes(state, DOH_PATH).layer(MockConnectInfo(remote));

        Self {
            router,
            resolver,
            cache,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }
}

pub struct TestResponse {
    pub status: axum::http::StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}
