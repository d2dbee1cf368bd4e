use std::fmt;

pub const DNS_JSON: &str = "application/dns-json";
pub const JSON: &str = "application/json";
pub const DNS_MESSAGE: &str = "application/dns-message";
pub const DNS_UDPWIREFORMAT: &str = "application/dns-udpwireformat";

/// The two encodings a DoH exchange can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// Google-style JSON: query parameters in, JSON document out.
    Json,
    /// RFC 8484 binary DNS message.
    Binary,
}

impl WireFormat {
    /// Maps a request media type to a format. Parameters such as
    /// `; charset=utf-8` are ignored.
    pub fn from_request_media_type(media_type: &str) -> Option<Self> {
        match essence(media_type).as_str() {
            DNS_JSON => Some(WireFormat::Json),
            DNS_MESSAGE | DNS_UDPWIREFORMAT => Some(WireFormat::Binary),
            _ => None,
        }
    }

    /// Maps an `Accept` entry to a response format.
    pub fn from_accept_media_type(media_type: &str) -> Option<Self> {
        match essence(media_type).as_str() {
            JSON => Some(WireFormat::Json),
            DNS_MESSAGE | DNS_UDPWIREFORMAT => Some(WireFormat::Binary),
            _ => None,
        }
    }

    pub fn response_content_type(&self) -> &'static str {
        match self {
            WireFormat::Json => "application/json; charset=UTF-8",
            WireFormat::Binary => DNS_MESSAGE,
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Json => f.write_str("json"),
            WireFormat::Binary => f.write_str("binary"),
        }
    }
}

fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
