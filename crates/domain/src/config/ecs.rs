use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EcsConfig {
    /// Synthesize ECS from private, loopback and other non-global client addresses.
    pub allow_non_global_ip: bool,

    /// Send the full client address (/32, /128) instead of /24 and /56.
    pub use_precise_ip: bool,
}
