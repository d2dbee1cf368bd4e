use std::fmt;

const KEY_PREFIX: &str = "dns:";
const STALE_SUFFIX: &str = ":stale";

/// Cache key for a single question: `dns:<lowercase name>:<numeric type>`.
///
/// The stale tier lives under the same key with a `:stale` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    fresh: String,
}

impl CacheKey {
    pub fn new(name: &str, record_type: u16) -> Self {
        Self {
            fresh: format!(
                "{}{}:{}",
                KEY_PREFIX,
                name.to_ascii_lowercase(),
                record_type
            ),
        }
    }

    pub fn fresh(&self) -> &str {
        &self.fresh
    }

    pub fn stale(&self) -> String {
        format!("{}{}", self.fresh, STALE_SUFFIX)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fresh)
    }
}
