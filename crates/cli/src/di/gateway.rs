use ferrous_doh_api::AppState;
use ferrous_doh_application::ports::CacheStore;
use ferrous_doh_application::services::ClientAddressResolver;
use ferrous_doh_application::use_cases::{CachePolicy, ResolveQueryUseCase};
use ferrous_doh_domain::config::CacheConfig;
use ferrous_doh_domain::Config;
use ferrous_doh_infrastructure::cache::{MemoryCacheStore, RedisCacheStore};
use ferrous_doh_infrastructure::dns::UpstreamResolver;
use ferrous_doh_infrastructure::system::GlobalIpClassifier;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const CACHE_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the HTTP front door and the background jobs share.
pub struct GatewayServices {
    pub state: AppState,
    /// Set only for the in-memory store, which needs periodic purging.
    pub memory_cache: Option<Arc<MemoryCacheStore>>,
}

impl GatewayServices {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let resolver = UpstreamResolver::from_config(&config.upstream)?;
        info!(
            upstreams = resolver.pool().len(),
            tries = config.upstream.tries,
            timeout_secs = config.upstream.timeout,
            "Upstream pool configured"
        );

        let mut use_case = ResolveQueryUseCase::new(Arc::new(resolver));
        let mut memory_cache = None;

        if config.cache.enabled {
            let (store, memory) = Self::build_cache(&config.cache).await;
            info!(backend = store.backend_name(), "Response cache enabled");
            use_case = use_case.with_cache(store, CachePolicy::from(&config.cache));
            memory_cache = memory;
        } else {
            info!("Response cache disabled");
        }

        let client_addresses = ClientAddressResolver::new(
            Arc::new(GlobalIpClassifier::new()),
            &config.ecs,
            config.logging.log_guessed_client_ip,
        );

        let state = AppState {
            resolve_query: Arc::new(use_case),
            client_addresses: Arc::new(client_addresses),
            debug_headers: config.server.debug_http_headers.clone().into(),
        };

        Ok(Self {
            state,
            memory_cache,
        })
    }

    async fn build_cache(
        config: &CacheConfig,
    ) -> (Arc<dyn CacheStore>, Option<Arc<MemoryCacheStore>>) {
        if let Some(endpoint) = config.external_endpoint() {
            let endpoint = normalize_endpoint(endpoint);
            match RedisCacheStore::connect(&endpoint, CACHE_CONNECT_TIMEOUT).await {
                Ok(store) => return (Arc::new(store), None),
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "External cache unavailable, using in-memory cache");
                }
            }
        }

        let memory = Arc::new(MemoryCacheStore::new(config.max_entries));
        (memory.clone(), Some(memory))
    }
}

/// `host:port` endpoints get the `redis://` scheme.
fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("redis://{}", endpoint)
    }
}
