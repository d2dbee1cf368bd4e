use axum::http::header::{HeaderName, CACHE_CONTROL, DATE, EXPIRES, LAST_MODIFIED, VARY};
use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Duration, Utc};
use hickory_proto::op::Message;

/// HTTP-date (RFC 7231 IMF-fixdate).
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub const X_CACHE_STATUS: HeaderName = HeaderName::from_static("x-cache-status");

/// Smallest TTL across every record section, and when it runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlSummary {
    pub least_ttl: u32,
    pub earliest_expiry: DateTime<Utc>,
}

impl TtlSummary {
    pub fn of(message: &Message, now: DateTime<Utc>) -> Option<Self> {
        let least_ttl = message
            .answers()
            .iter()
            .chain(message.name_servers())
            .chain(message.additionals())
            .map(|record| record.ttl())
            .min()?;

        Some(Self {
            least_ttl,
            earliest_expiry: now + Duration::seconds(i64::from(least_ttl)),
        })
    }
}

pub fn http_date(at: DateTime<Utc>) -> String {
    at.format(HTTP_DATE_FORMAT).to_string()
}

/// Set `Date`, `Last-Modified`, `Vary`, `X-Cache-Status` and, when any
/// record carries a TTL, `Cache-Control` and `Expires`.
pub fn apply(
    headers: &mut HeaderMap,
    ttl: Option<TtlSummary>,
    tailored: bool,
    from_cache: bool,
    now: DateTime<Utc>,
) {
    let now_str = http_date(now);
    if let Ok(value) = HeaderValue::from_str(&now_str) {
        headers.insert(DATE, value.clone());
        headers.insert(LAST_MODIFIED, value);
    }
    headers.insert(VARY, HeaderValue::from_static("Accept"));

    if let Some(ttl) = ttl {
        let scope = if tailored { "private" } else { "public" };
        if let Ok(value) = HeaderValue::from_str(&format!("{}, max-age={}", scope, ttl.least_ttl)) {
            headers.insert(CACHE_CONTROL, value);
        }
        if let Ok(value) = HeaderValue::from_str(&http_date(ttl.earliest_expiry)) {
            headers.insert(EXPIRES, value);
        }
    }

    let status = if from_cache { "HIT" } else { "MISS" };
    headers.insert(X_CACHE_STATUS, HeaderValue::from_static(status));
}
