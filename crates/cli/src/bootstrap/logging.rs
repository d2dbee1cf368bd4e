use ferrous_doh_domain::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

const GATEWAY_CRATES: &[&str] = &[
    "ferrous_doh",
    "ferrous_doh_api",
    "ferrous_doh_application",
    "ferrous_doh_infrastructure",
    "ferrous_doh_jobs",
    "tower_http",
];

/// `RUST_LOG` wins; otherwise `logging.level`, with the gateway's own
/// crates raised to `debug` when verbose.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.verbose)
        .try_init();
}

fn default_directives(config: &LoggingConfig) -> String {
    let mut directives = config.level.clone();
    if config.verbose {
        for krate in GATEWAY_CRATES {
            directives.push_str(&format!(",{}=debug", krate));
        }
    }
    directives
}
