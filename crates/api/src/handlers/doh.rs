use crate::codec::{self, RequestContext};
use crate::errors::ApiError;
use crate::negotiation::{is_form, negotiate};
use crate::params::DohParams;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, RawQuery, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderMap, Method,
    },
    response::{IntoResponse, Response},
};
use ferrous_doh_application::services::ClientHints;
use std::net::SocketAddr;
use tracing::{debug, info, instrument};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

#[instrument(skip_all, name = "doh_request", fields(method = %method, remote = %remote))]
pub async fn handle_doh(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, ApiError> {
    log_debug_headers(&state.debug_headers, &headers);

    if method == Method::OPTIONS {
        return Ok(().into_response());
    }

    let content_type = header_str(&headers, CONTENT_TYPE.as_str());
    let form_body = (method == Method::POST && content_type.is_some_and(is_form))
        .then_some(body.as_ref());
    let params = DohParams::parse(query.as_deref(), form_body);

    let negotiation = negotiate(
        &params,
        content_type,
        header_str(&headers, ACCEPT.as_str()),
    )?;
    debug!(
        request_format = %negotiation.request,
        response_format = %negotiation.response,
        "Negotiated DoH formats"
    );

    let ctx = RequestContext {
        method: &method,
        params: &params,
        body: if form_body.is_some() { &[] } else { body.as_ref() },
        hints: ClientHints {
            no_ecs: params.flag("no_ecs"),
            forwarded_for: header_str(&headers, X_FORWARDED_FOR),
            real_ip: header_str(&headers, X_REAL_IP),
            remote: Some(remote.ip()),
        },
        client_addresses: &state.client_addresses,
    };

    let mut txn = codec::parse_request(negotiation.request, &ctx)?;
    txn.force_recursion_for_root();

    state.resolve_query.execute(&mut txn).await?;

    debug!(
        upstream = ?txn.upstream.as_ref().map(|u| u.to_string()),
        from_cache = txn.from_cache,
        tailored = txn.tailored,
        "DoH request resolved"
    );

    Ok(codec::render_response(negotiation.response, &txn)?)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn log_debug_headers(names: &[String], headers: &HeaderMap) {
    for name in names {
        if let Some(value) = header_str(headers, name) {
            info!(header = %name, value, "Request header");
        }
    }
}
