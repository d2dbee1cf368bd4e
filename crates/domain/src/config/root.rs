use serde::{Deserialize, Serialize};

use super::cache::CacheConfig;
use super::ecs::EcsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::{non_empty, ServerConfig};
use super::upstream::UpstreamConfig;

const LOCAL_CONFIG_PATH: &str = "ferrous-doh.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/ferrous-doh/config.toml";

/// Main configuration structure for Ferrous DoH
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP front door (listeners, path, TLS)
    pub server: ServerConfig,

    /// Upstream pool and retry policy
    pub upstream: UpstreamConfig,

    /// EDNS Client Subnet policy
    pub ecs: EcsConfig,

    /// Response cache
    pub cache: CacheConfig,

    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-doh.toml in current directory
    /// 3. /etc/ferrous-doh/config.toml
    /// 4. Default configuration
    ///
    /// Environment overrides are applied on top of the file, then CLI overrides.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `DOH_*` and `REDIS_URL` overrides. Unset or empty variables are skipped.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(listen) = var("DOH_SERVER_LISTEN") {
            let listen = if listen.contains(':') {
                listen
            } else {
                format!("0.0.0.0:{}", listen)
            };
            self.server.listen = vec![listen];
        }

        if let Some(prefix) = var("DOH_HTTP_PREFIX") {
            self.server.path = prefix;
        }

        if let Some(upstream) = var("DOH_UPSTREAM_DNS") {
            self.upstream.servers = upstream
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(timeout) = var("DOH_SERVER_TIMEOUT") {
            self.upstream.timeout = timeout
                .parse()
                .map_err(|_| ConfigError::Environment("DOH_SERVER_TIMEOUT".to_string(), timeout))?;
        }

        if let Some(tries) = var("DOH_SERVER_TRIES") {
            self.upstream.tries = tries
                .parse()
                .map_err(|_| ConfigError::Environment("DOH_SERVER_TRIES".to_string(), tries))?;
        }

        if let Some(verbose) = var("DOH_SERVER_VERBOSE") {
            self.logging.verbose = verbose == "true";
        }

        if let Some(endpoint) = var("REDIS_URL") {
            self.cache.endpoint = Some(endpoint);
        }

        Ok(())
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if !overrides.listen.is_empty() {
            self.server.listen = overrides.listen;
        }
        if let Some(path) = overrides.path {
            self.server.path = path;
        }
        if !overrides.upstream.is_empty() {
            self.upstream.servers = overrides.upstream;
        }
        if overrides.verbose {
            self.logging.verbose = true;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen.is_empty() {
            return Err(ConfigError::Validation(
                "No listen addresses configured".to_string(),
            ));
        }

        if !self.server.path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "HTTP path '{}' must start with '/'",
                self.server.path
            )));
        }

        if self.upstream.servers.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream servers configured".to_string(),
            ));
        }

        self.upstream
            .parse_servers()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if self.upstream.tries == 0 {
            return Err(ConfigError::Validation("tries must be at least 1".to_string()));
        }

        if self.upstream.timeout == 0 {
            return Err(ConfigError::Validation(
                "timeout must be at least 1 second".to_string(),
            ));
        }

        if self.cache.stale_ttl < self.cache.fresh_ttl {
            return Err(ConfigError::Validation(format!(
                "stale_ttl ({}) must not be shorter than fresh_ttl ({})",
                self.cache.stale_ttl, self.cache.fresh_ttl
            )));
        }

        if non_empty(&self.server.cert) != non_empty(&self.server.key) {
            return Err(ConfigError::Validation(
                "cert and key must be configured together".to_string(),
            ));
        }

        if self.server.tls_client_auth {
            if !self.server.tls_enabled() {
                return Err(ConfigError::Validation(
                    "tls_client_auth requires cert and key".to_string(),
                ));
            }
            if !non_empty(&self.server.tls_client_auth_ca) {
                return Err(ConfigError::Validation(
                    "tls_client_auth requires tls_client_auth_ca".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub listen: Vec<String>,
    pub path: Option<String>,
    pub upstream: Vec<String>,
    pub verbose: bool,
    pub log_level: Option<String>,
}
