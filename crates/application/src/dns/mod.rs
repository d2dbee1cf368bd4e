pub mod query_builder;
pub mod transaction;

pub use query_builder::{
    attach_client_subnet, client_subnet_of, has_client_subnet, QueryBuilder, EDNS_UDP_PAYLOAD,
};
pub use transaction::DnsTransaction;
