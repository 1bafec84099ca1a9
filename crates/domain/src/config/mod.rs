//! Configuration module for Ferrous Fanmerge
//!
//! - `root`: Main configuration and CLI overrides
//! - `server`: Listener binding for the `serve` command
//! - `fanmerge`: Fan-out, retry and filtering settings
//! - `upstream`: Upstream endpoint parsing
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod errors;
pub mod fanmerge;
pub mod logging;
pub mod root;
pub mod server;
pub mod upstream;

pub use errors::ConfigError;
pub use fanmerge::FanmergeConfig;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use upstream::{NetworkKind, UpstreamEndpoint};
