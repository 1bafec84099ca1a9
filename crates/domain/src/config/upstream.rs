use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

const DEFAULT_DNS_PORT: u16 = 53;
const DEFAULT_DOT_PORT: u16 = 853;

/// Network transport used to reach an upstream resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    #[default]
    Udp,
    Tcp,
    Tls,
}

impl NetworkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkKind::Udp => "udp",
            NetworkKind::Tcp => "tcp",
            NetworkKind::Tls => "tls",
        }
    }

    /// Port implied when an endpoint omits one.
    pub fn default_port(&self) -> u16 {
        match self {
            NetworkKind::Tls => DEFAULT_DOT_PORT,
            NetworkKind::Udp | NetworkKind::Tcp => DEFAULT_DNS_PORT,
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" | "dns" => Ok(NetworkKind::Udp),
            "tcp" => Ok(NetworkKind::Tcp),
            "tls" | "dot" => Ok(NetworkKind::Tls),
            other => Err(format!(
                "unsupported network '{other}' (expected udp, tcp or tls)"
            )),
        }
    }
}

/// One configured upstream: an address plus an optional per-endpoint transport.
///
/// Accepted forms:
/// - `8.8.8.8` (port 53 implied)
/// - `8.8.8.8:5353`, `[2001:4860:4860::8888]:53`
/// - `udp://1.1.1.1:53`, `tcp://1.1.1.1`
/// - `tls://1.1.1.1` (port 853 implied)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpstreamEndpoint {
    pub addr: SocketAddr,
    pub network: Option<NetworkKind>,
}

impl UpstreamEndpoint {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            network: None,
        }
    }

    /// Transport for this endpoint, falling back to the plugin-wide default.
    pub fn network_or(&self, default: NetworkKind) -> NetworkKind {
        self.network.unwrap_or(default)
    }
}

impl FromStr for UpstreamEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (network, rest) = match s.split_once("://") {
            Some((scheme, rest)) => (Some(scheme.parse::<NetworkKind>()?), rest),
            None => (None, s),
        };

        if let Ok(addr) = rest.parse::<SocketAddr>() {
            return Ok(Self { addr, network });
        }

        let host = rest.trim_start_matches('[').trim_end_matches(']');
        let ip = host
            .parse::<IpAddr>()
            .map_err(|_| format!("invalid upstream endpoint '{s}'"))?;
        let port = network.map_or(DEFAULT_DNS_PORT, |n| n.default_port());
        Ok(Self {
            addr: SocketAddr::new(ip, port),
            network,
        })
    }
}

impl fmt::Display for UpstreamEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.network {
            Some(network) => write!(f, "{}://{}", network, self.addr),
            None => write!(f, "{}", self.addr),
        }
    }
}
