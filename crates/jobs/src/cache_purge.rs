use ferrous_doh_application::ports::CacheStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const DEFAULT_PURGE_INTERVAL_SECS: u64 = 60;

/// Periodically drops expired entries from stores without native expiry.
pub struct CachePurgeJob {
    store: Arc<dyn CacheStore>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl CachePurgeJob {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            interval_secs: DEFAULT_PURGE_INTERVAL_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, secs: u64) -> Self {
        self.interval_secs = secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            backend = self.store.backend_name(),
            interval_secs = self.interval_secs,
            "Starting cache purge job"
        );

        let job = Arc::clone(&self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(job.interval_secs));
            loop {
                tokio::select! {
                    _ = job.shutdown.cancelled() => {
                        info!("CachePurgeJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match job.store.purge_expired().await {
                            Ok(0) => debug!("Cache purge found nothing to drop"),
                            Ok(removed) => info!(removed, "Cache purge cycle completed"),
                            Err(e) => error!(error = %e, "Cache purge cycle failed"),
                        }
                    }
                }
            }
        });
    }
}
