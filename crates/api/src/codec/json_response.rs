use super::cache_headers::{self, TtlSummary};
use super::json_model::{JsonQuestion, JsonRecord, JsonResponse, QuestionList};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use ferrous_doh_application::dns::{client_subnet_of, DnsTransaction};
use ferrous_doh_domain::{DomainError, WireFormat};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::Record;
use std::net::{IpAddr, Ipv4Addr};

/// `Expires` inside JSON records (Go's RFC1123 layout in UTC).
const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S UTC";

/// Convert a DNS message into the JSON document.
pub fn marshal(message: &Message, now: DateTime<Utc>) -> JsonResponse {
    let render = |records: &[Record]| -> Vec<JsonRecord> {
        records.iter().map(|r| marshal_record(r, now)).collect()
    };

    JsonResponse {
        status: u32::from(u16::from(message.response_code())),
        tc: message.truncated(),
        rd: message.recursion_desired(),
        ra: message.recursion_available(),
        ad: message.authentic_data(),
        cd: message.checking_disabled(),
        question: QuestionList(
            message
                .queries()
                .iter()
                .map(|q| JsonQuestion {
                    name: q.name().to_ascii(),
                    record_type: u16::from(q.query_type()),
                })
                .collect(),
        ),
        answer: render(message.answers()),
        authority: render(message.name_servers()),
        additional: render(message.additionals()),
        comment: None,
        edns_client_subnet: client_subnet_of(message).map(|ecs| {
            let addr = match ecs.addr() {
                IpAddr::V6(v6) if v6.is_unspecified() => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(IpAddr::V6(v6)),
                v4 => v4,
            };
            format!("{}/{}", addr, ecs.scope_prefix())
        }),
    }
}

fn marshal_record(record: &Record, now: DateTime<Utc>) -> JsonRecord {
    let expires = now + Duration::seconds(i64::from(record.ttl()));
    JsonRecord {
        name: record.name().to_ascii(),
        record_type: u16::from(record.record_type()),
        ttl: record.ttl(),
        expires: expires.format(RFC1123_FORMAT).to_string(),
        data: record.data().to_string(),
    }
}

pub fn render(txn: &DnsTransaction) -> Result<Response, DomainError> {
    let message = txn
        .response
        .as_ref()
        .ok_or_else(|| DomainError::Serialization("no response to render".to_string()))?;
    let now = Utc::now();

    let body = serde_json::to_vec(&marshal(message, now))
        .map_err(|e| DomainError::Serialization(e.to_string()))?;

    let status = if message.response_code() == ResponseCode::ServFail {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(WireFormat::Json.response_content_type()),
    );
    cache_headers::apply(
        headers,
        TtlSummary::of(message, now),
        txn.tailored,
        txn.from_cache,
        now,
    );

    Ok(response)
}
