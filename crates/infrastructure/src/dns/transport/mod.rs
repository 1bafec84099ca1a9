pub mod tcp;
pub mod tls;
pub mod udp;

use async_trait::async_trait;
use ferrous_fanmerge_domain::{DomainError, NetworkKind};
use std::net::SocketAddr;
use std::time::Duration;

/// Result of a raw DNS transport operation
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format)
    pub bytes: Vec<u8>,
    /// Which protocol was used
    pub protocol_used: &'static str,
}

/// Trait for sending raw DNS messages over the wire
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

/// Enum-dispatched transport, no Box/vtable on the query path.
pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    Tls(tls::TlsTransport),
}

impl Transport {
    pub fn new(addr: SocketAddr, network: NetworkKind) -> Self {
        match network {
            NetworkKind::Udp => Self::Udp(udp::UdpTransport::new(addr)),
            NetworkKind::Tcp => Self::Tcp(tcp::TcpTransport::new(addr)),
            NetworkKind::Tls => Self::tls(addr, None),
        }
    }

    /// TLS transport verifying the upstream certificate against `server_name`.
    pub fn tls(addr: SocketAddr, server_name: Option<String>) -> Self {
        Self::Tls(tls::TlsTransport::new(addr, server_name))
    }

    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tls(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    /// Protocol name for logging.
    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
            Self::Tls(_) => "TLS",
        }
    }
}

/// Transaction ID from the first two bytes of a wire message (0 when too short).
pub(crate) fn expected_id(message_bytes: &[u8]) -> u16 {
    match message_bytes {
        [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]),
        _ => 0,
    }
}
