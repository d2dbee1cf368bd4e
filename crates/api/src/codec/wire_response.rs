use super::cache_headers::{self, TtlSummary};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use ferrous_doh_application::dns::DnsTransaction;
use ferrous_doh_domain::{DomainError, WireFormat};
use hickory_proto::op::ResponseCode;

pub fn render(txn: &DnsTransaction) -> Result<Response, DomainError> {
    let mut message = txn
        .response
        .clone()
        .ok_or_else(|| DomainError::Serialization("no response to render".to_string()))?;

    if let Some(client_id) = txn.client_id() {
        message.set_id(client_id);
    }

    let body = message
        .to_vec()
        .map_err(|e| DomainError::Serialization(e.to_string()))?;
    let now = Utc::now();

    let status = if message.response_code() == ResponseCode::ServFail {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(WireFormat::Binary.response_content_type()),
    );
    cache_headers::apply(
        headers,
        TtlSummary::of(&message, now),
        txn.tailored,
        txn.from_cache,
        now,
    );

    Ok(response)
}
