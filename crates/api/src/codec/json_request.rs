use super::RequestContext;
use ferrous_doh_application::dns::{DnsTransaction, QueryBuilder};
use ferrous_doh_domain::{ClientSubnet, DomainError};
use tracing::debug;

pub fn parse(ctx: &RequestContext<'_>) -> Result<DnsTransaction, DomainError> {
    let params = ctx.params;

    let name = QueryBuilder::parse_name(params.get("name").unwrap_or_default())?;
    let record_type = QueryBuilder::parse_record_type(params.get("type").unwrap_or_default())?;
    let checking_disabled = parse_cd(params.get("cd").unwrap_or_default())?;

    let (subnet, tailored) = match params.get_non_empty("edns_client_subnet") {
        Some(explicit) => (Some(explicit.parse::<ClientSubnet>()?), true),
        None => (ctx.client_addresses.synthesize(&ctx.hints), false),
    };

    debug!(
        name = %name,
        record_type = %record_type,
        checking_disabled,
        subnet = ?subnet.map(|s| s.to_string()),
        tailored,
        "Parsed JSON DoH request"
    );

    let query = QueryBuilder::build(name, record_type, checking_disabled, subnet.as_ref());
    Ok(DnsTransaction::new(query, tailored))
}

fn parse_cd(raw: &str) -> Result<bool, DomainError> {
    match raw {
        "" | "0" => Ok(false),
        "1" => Ok(true),
        v if v.eq_ignore_ascii_case("false") => Ok(false),
        v if v.eq_ignore_ascii_case("true") => Ok(true),
        v => Err(DomainError::InvalidArgument {
            name: "cd",
            value: v.to_string(),
        }),
    }
}
