use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::ConfigError;
use super::fanmerge::FanmergeConfig;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::upstream::{NetworkKind, UpstreamEndpoint};
use crate::validators::validate_domain_name;

/// Root configuration file layout
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub fanmerge: FanmergeConfig,
}

/// Values given on the command line win over the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
    pub upstreams: Vec<String>,
    pub net: Option<NetworkKind>,
    pub tls_server_name: Option<String>,
    pub attempts: Option<u32>,
    pub deadline_ms: Option<u64>,
}

impl Config {
    /// Load from `path` (or defaults when `None`) and apply CLI overrides.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if !overrides.upstreams.is_empty() {
            self.fanmerge.upstreams = overrides.upstreams;
        }
        if let Some(net) = overrides.net {
            self.fanmerge.net = net;
        }
        if let Some(name) = overrides.tls_server_name {
            self.fanmerge.tls_server_name = Some(name);
        }
        if let Some(attempts) = overrides.attempts {
            self.fanmerge.attempts = attempts;
        }
        if let Some(deadline) = overrides.deadline_ms {
            self.fanmerge.deadline_ms = deadline;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fanmerge = &self.fanmerge;

        if fanmerge.upstreams.is_empty() {
            return Err(ConfigError::Validation(
                "fanmerge.upstreams must list at least one server".into(),
            ));
        }
        self.upstream_endpoints()?;

        if fanmerge.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "fanmerge.timeout_ms must be greater than zero".into(),
            ));
        }
        if fanmerge.deadline_ms == 0 {
            return Err(ConfigError::Validation(
                "fanmerge.deadline_ms must be greater than zero".into(),
            ));
        }

        validate_domain_name(&fanmerge.from).map_err(ConfigError::Validation)?;
        for domain in &fanmerge.except {
            validate_domain_name(domain).map_err(ConfigError::Validation)?;
        }
        if let Some(name) = &fanmerge.tls_server_name {
            validate_domain_name(name)
                .map_err(|e| ConfigError::Validation(format!("fanmerge.tls_server_name: {e}")))?;
        }

        Ok(())
    }

    pub fn upstream_endpoints(&self) -> Result<Vec<UpstreamEndpoint>, ConfigError> {
        self.fanmerge
            .upstreams
            .iter()
            .map(|s| {
                s.parse::<UpstreamEndpoint>()
                    .map_err(|e| ConfigError::Validation(format!("fanmerge.upstreams: {e}")))
            })
            .collect()
    }
}
