use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Addresses the HTTP(S) front door listens on, one task per entry.
    pub listen: Vec<String>,

    pub path: String,

    /// PEM certificate chain. HTTPS is served when both `cert` and `key` are set.
    pub cert: Option<String>,

    pub key: Option<String>,

    pub tls_client_auth: bool,

    pub tls_client_auth_ca: Option<String>,

    /// Request headers logged verbatim for every DoH request.
    pub debug_http_headers: Vec<String>,
}

impl ServerConfig {
    pub fn tls_enabled(&self) -> bool {
        non_empty(&self.cert) && non_empty(&self.key)
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: vec!["0.0.0.0:8053".to_string()],
            path: "/dns-query".to_string(),
            cert: None,
            key: None,
            tls_client_auth: false,
            tls_client_auth_ca: None,
            debug_http_headers: Vec::new(),
        }
    }
}
