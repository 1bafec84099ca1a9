use super::tcp::{exchange_framed, io_error};
use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use ferrous_fanmerge_domain::DomainError;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

/// Client config trusting the Mozilla root set.
fn client_config() -> Arc<ClientConfig> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    Arc::new(
        ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
}

/// DNS over TLS (RFC 7858): TCP framing inside a TLS session.
pub struct TlsTransport {
    server_addr: SocketAddr,
    server_name: Option<String>,
    connector: TlsConnector,
}

impl TlsTransport {
    /// `server_name` is checked against the upstream certificate; without one
    /// the certificate must carry the server IP.
    pub fn new(server_addr: SocketAddr, server_name: Option<String>) -> Self {
        Self {
            server_addr,
            server_name,
            connector: TlsConnector::from(client_config()),
        }
    }

    pub fn server_name(&self) -> Result<ServerName<'static>, DomainError> {
        match &self.server_name {
            Some(name) => ServerName::try_from(name.clone()).map_err(|e| DomainError::TransportIo {
                server: self.server_addr.to_string(),
                reason: format!("invalid TLS server name '{name}': {e}"),
            }),
            None => Ok(ServerName::IpAddress(self.server_addr.ip().into())),
        }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let server_name = self.server_name()?;
        let tcp = TcpStream::connect(self.server_addr)
            .await
            .map_err(|e| io_error(self.server_addr, "connect", e))?;
        tcp.set_nodelay(true).ok();

        let mut stream = self
            .connector
            .connect(server_name, tcp)
            .await
            .map_err(|e| io_error(self.server_addr, "tls handshake", e))?;
        debug!(server = %self.server_addr, "TLS session established");

        exchange_framed(&mut stream, self.server_addr, message_bytes).await
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })??;

        Ok(TransportResponse {
            bytes,
            protocol_used: "TLS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TLS"
    }
}
