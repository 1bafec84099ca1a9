use serde::{Deserialize, Serialize};

use super::upstream::NetworkKind;

/// Fan-out / merge plugin configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FanmergeConfig {
    /// Default transport for upstreams that don't carry a scheme
    #[serde(default)]
    pub net: NetworkKind,

    /// Per-attempt timeout applied by each upstream client (milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Attempts per upstream before giving up; 0 retries until the deadline
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Overall processing window for one fanned-out query (milliseconds)
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Pause between two attempts against the same upstream (milliseconds)
    #[serde(default = "default_attempt_delay_ms")]
    pub attempt_delay_ms: u64,

    /// Only names equal to or below this zone are fanned out
    #[serde(default = "default_from")]
    pub from: String,

    /// Domains (and their subdomains) passed to the next handler untouched
    #[serde(default)]
    pub except: Vec<String>,

    /// Upstream endpoints, e.g. "8.8.8.8:53", "tcp://1.1.1.1" or "tls://9.9.9.9"
    #[serde(default)]
    pub upstreams: Vec<String>,

    /// Name checked against the certificate of TLS upstreams; their IP otherwise
    #[serde(default)]
    pub tls_server_name: Option<String>,
}

impl Default for FanmergeConfig {
    fn default() -> Self {
        Self {
            net: NetworkKind::Udp,
            timeout_ms: default_timeout_ms(),
            attempts: default_attempts(),
            deadline_ms: default_deadline_ms(),
            attempt_delay_ms: default_attempt_delay_ms(),
            from: default_from(),
            except: vec![],
            upstreams: vec![],
            tls_server_name: None,
        }
    }
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_attempts() -> u32 {
    3
}

fn default_deadline_ms() -> u64 {
    30_000
}

fn default_attempt_delay_ms() -> u64 {
    100
}

fn default_from() -> String {
    ".".to_string()
}
