use super::RequestContext;
use axum::http::Method;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ferrous_doh_application::dns::{attach_client_subnet, has_client_subnet, DnsTransaction};
use ferrous_doh_domain::DomainError;
use hickory_proto::op::Message;
use std::borrow::Cow;
use tracing::debug;

pub fn parse(ctx: &RequestContext<'_>) -> Result<DnsTransaction, DomainError> {
    let raw = payload(ctx)?;

    let mut message =
        Message::from_vec(&raw).map_err(|e| DomainError::MalformedPacket(e.to_string()))?;

    let tailored = if has_client_subnet(&message) {
        true
    } else {
        if let Some(subnet) = ctx.client_addresses.synthesize(&ctx.hints) {
            attach_client_subnet(&mut message, &subnet);
        }
        false
    };

    debug!(
        id = message.id(),
        questions = message.queries().len(),
        tailored,
        "Parsed binary DoH request"
    );

    Ok(DnsTransaction::with_client_id(message, tailored))
}

/// Raw POST body, or the base64url `dns` parameter (padding tolerated).
fn payload<'a>(ctx: &RequestContext<'a>) -> Result<Cow<'a, [u8]>, DomainError> {
    if *ctx.method == Method::POST && !ctx.body.is_empty() {
        return Ok(Cow::Borrowed(ctx.body));
    }

    let encoded = ctx
        .params
        .get_non_empty("dns")
        .ok_or_else(|| DomainError::InvalidArgument {
            name: "dns",
            value: String::new(),
        })?;

    URL_SAFE_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .map(Cow::Owned)
        .map_err(|e| DomainError::MalformedPacket(e.to_string()))
}
