use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,

    /// Per-request access logging and debug output from the gateway crates.
    pub verbose: bool,

    pub log_guessed_client_ip: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
            log_guessed_client_ip: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
