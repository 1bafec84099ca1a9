//! Ferrous Fanmerge Domain Layer
pub mod config;
pub mod errors;
pub mod validators;

pub use config::{
    CliOverrides, Config, ConfigError, FanmergeConfig, NetworkKind, UpstreamEndpoint,
};
pub use errors::DomainError;
