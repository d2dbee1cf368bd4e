mod client_address;

pub use client_address::{ClientAddressResolver, ClientHints};
