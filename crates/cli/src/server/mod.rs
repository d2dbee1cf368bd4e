pub mod http;
pub mod tls;

pub use http::start_doh_servers;
