//! Canonical DNS query construction.
//!
//! Both request formats end up as a hickory `Message` with a single IN-class
//! question, RD set, and an OPT record advertising a 4096-byte payload with DO.

use ferrous_doh_domain::{ClientSubnet, DomainError};
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::opt::{self, EdnsCode, EdnsOption};
use hickory_proto::rr::{DNSClass, Name, RecordType};

/// UDP payload size advertised in the OPT record.
pub const EDNS_UDP_PAYLOAD: u16 = 4096;

pub struct QueryBuilder;

impl QueryBuilder {
    /// Build the query sent upstream for a JSON request.
    pub fn build(
        name: Name,
        record_type: RecordType,
        checking_disabled: bool,
        subnet: Option<&ClientSubnet>,
    ) -> Message {
        let mut query = Query::query(name, record_type);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new();
        message
            .set_id(fastrand::u16(..))
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .set_checking_disabled(checking_disabled)
            .add_query(query);

        let edns = message.extensions_mut().get_or_insert_with(Edns::new);
        edns.set_max_payload(EDNS_UDP_PAYLOAD);
        edns.set_dnssec_ok(true);
        if let Some(subnet) = subnet {
            edns.options_mut().insert(to_edns_option(subnet));
        }

        message
    }

    /// Make `raw` fully qualified. ASCII input is taken as-is (case and
    /// underscores kept); anything else is IDNA-encoded first.
    pub fn parse_name(raw: &str) -> Result<Name, DomainError> {
        if raw.is_empty() {
            return Err(DomainError::InvalidArgument {
                name: "name",
                value: String::new(),
            });
        }
        if raw == "." {
            return Ok(Name::root());
        }

        let parsed = if raw.is_ascii() {
            Name::from_ascii(raw)
        } else {
            Name::from_utf8(raw)
        };
        let mut name = parsed.map_err(|e| DomainError::InvalidQueryName {
            name: raw.to_string(),
            reason: e.to_string(),
        })?;
        name.set_fqdn(true);
        Ok(name)
    }

    /// Resolve a `type` parameter: a numeric RR type code or a mnemonic.
    pub fn parse_record_type(raw: &str) -> Result<RecordType, DomainError> {
        if raw.is_empty() {
            return Ok(RecordType::A);
        }
        if let Ok(code) = raw.parse::<u16>() {
            return Ok(RecordType::from(code));
        }
        raw.to_ascii_uppercase()
            .parse::<RecordType>()
            .ok()
            .filter(|t| !matches!(t, RecordType::Unknown(_)))
            .ok_or_else(|| DomainError::InvalidArgument {
                name: "type",
                value: raw.to_string(),
            })
    }
}

fn to_edns_option(subnet: &ClientSubnet) -> EdnsOption {
    EdnsOption::Subnet(opt::ClientSubnet::new(
        subnet.address(),
        subnet.source_prefix(),
        0,
    ))
}

/// ECS option carried in the message's OPT record, if any.
pub fn client_subnet_of(message: &Message) -> Option<&opt::ClientSubnet> {
    match message.extensions().as_ref()?.option(EdnsCode::Subnet)? {
        EdnsOption::Subnet(subnet) => Some(subnet),
        _ => None,
    }
}

pub fn has_client_subnet(message: &Message) -> bool {
    client_subnet_of(message).is_some()
}

/// Add an ECS option, creating the OPT record when the message has none.
/// An existing OPT keeps its payload size and flags.
pub fn attach_client_subnet(message: &mut Message, subnet: &ClientSubnet) {
    let edns = message.extensions_mut().get_or_insert_with(|| {
        let mut edns = Edns::new();
        edns.set_max_payload(EDNS_UDP_PAYLOAD);
        edns
    });
    edns.options_mut().insert(to_edns_option(subnet));
}
