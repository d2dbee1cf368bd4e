pub mod dns;

pub use dns::{CachePolicy, ResolveQueryUseCase};
