//! Ferrous DoH Application Layer
pub mod dns;
pub mod ports;
pub mod services;
pub mod use_cases;
