use clap::Parser;
use ferrous_doh_api::create_doh_routes;
use ferrous_doh_domain::CliOverrides;
use ferrous_doh_jobs::{CachePurgeJob, JobRunner};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "ferrous-doh")]
#[command(version)]
#[command(about = "Ferrous DoH - DNS-over-HTTPS gateway to conventional DNS upstreams")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "conf", value_name = "FILE")]
    config: Option<String>,

    /// Listen address (repeatable)
    #[arg(short = 'l', long)]
    listen: Vec<String>,

    /// HTTP path of the DoH endpoint
    #[arg(long)]
    path: Option<String>,

    /// Upstream server as transport:host:port (repeatable)
    #[arg(short = 'u', long)]
    upstream: Vec<String>,

    /// Per-request access logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        listen: cli.listen,
        path: cli.path,
        upstream: cli.upstream,
        verbose: cli.verbose,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config.logging);

    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    info!("Starting Ferrous DoH v{}", env!("CARGO_PKG_VERSION"));

    let services = di::GatewayServices::new(&config).await?;

    let shutdown = CancellationToken::new();
    if let Some(store) = services.memory_cache.clone() {
        JobRunner::new()
            .with_cache_purge(CachePurgeJob::new(store).with_interval(config.cache.purge_interval))
            .with_shutdown_token(shutdown.clone())
            .start()
            .await;
    }

    let mut app = create_doh_routes(services.state, &config.server.path);
    if config.logging.verbose {
        app = app.layer(TraceLayer::new_for_http());
    }

    let result = tokio::select! {
        result = server::start_doh_servers(&config.server, app) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    };

    shutdown.cancel();
    info!("Server shutdown complete");
    result
}
