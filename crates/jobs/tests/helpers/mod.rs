#![allow(dead_code)]

mod mock_cache_store;

pub use mock_cache_store::MockPurgeStore;
