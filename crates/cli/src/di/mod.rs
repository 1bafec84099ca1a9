use ferrous_fanmerge_application::ports::DnsHandler;
use ferrous_fanmerge_domain::Config;
use ferrous_fanmerge_infrastructure::dns::{Fanmerge, FanmergeSettings, RefusedHandler};
use std::sync::Arc;

/// Handler chain: fanmerge first, REFUSED for whatever it passes on.
pub fn build_chain(config: &Config) -> anyhow::Result<Arc<dyn DnsHandler>> {
    let endpoints = config.upstream_endpoints()?;
    let fanmerge = Fanmerge::builder(FanmergeSettings::from(&config.fanmerge))
        .with_endpoints(&endpoints)
        .with_next(Arc::new(RefusedHandler))
        .build()?;
    Ok(Arc::new(fanmerge))
}
