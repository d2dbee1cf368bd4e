//! Ferrous DoH Infrastructure Layer
pub mod cache;
pub mod dns;
pub mod system;
