//! Request parsers and response formatters for both DoH encodings.

pub mod cache_headers;
pub mod json_model;
pub mod json_request;
pub mod json_response;
pub mod wire_request;
pub mod wire_response;

use crate::params::DohParams;
use axum::http::Method;
use axum::response::Response;
use ferrous_doh_application::dns::DnsTransaction;
use ferrous_doh_application::services::{ClientAddressResolver, ClientHints};
use ferrous_doh_domain::{DomainError, WireFormat};

/// Everything a request parser may look at.
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub params: &'a DohParams,
    pub body: &'a [u8],
    pub hints: ClientHints<'a>,
    pub client_addresses: &'a ClientAddressResolver,
}

pub fn parse_request(
    format: WireFormat,
    ctx: &RequestContext<'_>,
) -> Result<DnsTransaction, DomainError> {
    match format {
        WireFormat::Json => json_request::parse(ctx),
        WireFormat::Binary => wire_request::parse(ctx),
    }
}

pub fn render_response(
    format: WireFormat,
    txn: &DnsTransaction,
) -> Result<Response, DomainError> {
    match format {
        WireFormat::Json => json_response::render(txn),
        WireFormat::Binary => wire_response::render(txn),
    }
}
