pub mod global_ip;

pub use global_ip::GlobalIpClassifier;
