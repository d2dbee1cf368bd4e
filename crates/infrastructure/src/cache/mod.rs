pub mod memory;
pub mod redis;

pub use memory::MemoryCacheStore;
pub use redis::RedisCacheStore;
