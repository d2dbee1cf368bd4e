use ferrous_doh_domain::UpstreamSpec;

/// Picks the upstream for one attempt. Attempts are independent, so the
/// same upstream may be picked again.
pub trait UpstreamSelector: Send + Sync {
    fn select<'a>(&self, pool: &'a [UpstreamSpec]) -> &'a UpstreamSpec;
}

/// Uniform random choice with replacement.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl UpstreamSelector for RandomSelector {
    fn select<'a>(&self, pool: &'a [UpstreamSpec]) -> &'a UpstreamSpec {
        &pool[fastrand::usize(..pool.len())]
    }
}
