use ferrous_fanmerge_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}

/// Called once logging is up, so the summary actually reaches the subscriber.
pub fn log_config(config_path: Option<&str>, config: &Config) {
    let fanmerge = &config.fanmerge;
    info!(
        config_file = config_path.unwrap_or("default"),
        dns_port = config.server.dns_port,
        bind = %config.server.bind_address,
        upstreams = fanmerge.upstreams.len(),
        net = %fanmerge.net,
        attempts = fanmerge.attempts,
        deadline_ms = fanmerge.deadline_ms,
        from = %fanmerge.from,
        "Configuration loaded"
    );
}
