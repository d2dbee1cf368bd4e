pub mod transport;
pub mod upstream;

pub use upstream::{RandomSelector, UpstreamResolver, UpstreamSelector};
