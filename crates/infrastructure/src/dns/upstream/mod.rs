pub mod engine;
pub mod exchange;
pub mod selector;

pub use engine::UpstreamResolver;
pub use exchange::{NetworkExchange, UpstreamExchange};
pub use selector::{RandomSelector, UpstreamSelector};
