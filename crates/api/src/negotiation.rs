//! Content negotiation for the DoH endpoint.
//!
//! The request format comes from the `ct` parameter, then `Content-Type`,
//! then a guess from which parameter is present. The response format comes
//! from the first recognized `Accept` entry and otherwise mirrors the
//! request format.

use crate::params::DohParams;
use ferrous_doh_domain::{DomainError, WireFormat};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// The {parser, formatter} pair for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiation {
    pub request: WireFormat,
    pub response: WireFormat,
}

pub fn negotiate(
    params: &DohParams,
    content_type: Option<&str>,
    accept: Option<&str>,
) -> Result<Negotiation, DomainError> {
    let declared = params
        .get_non_empty("ct")
        .or_else(|| content_type.filter(|ct| !ct.trim().is_empty() && !is_form(ct)));

    let request = match declared {
        Some(ct) => WireFormat::from_request_media_type(ct)
            .ok_or_else(|| DomainError::UnsupportedContentType(ct.to_string()))?,
        None if params.get_non_empty("name").is_some() => WireFormat::Json,
        None if params.get_non_empty("dns").is_some() => WireFormat::Binary,
        None => return Err(DomainError::UnsupportedContentType(String::new())),
    };

    let response = accept
        .and_then(|accept| {
            accept
                .split(',')
                .find_map(WireFormat::from_accept_media_type)
        })
        .unwrap_or(request);

    Ok(Negotiation { request, response })
}

pub(crate) fn is_form(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(FORM_URLENCODED))
}
