use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use ferrous_fanmerge_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

pub(crate) fn io_error(server: SocketAddr, action: &str, e: std::io::Error) -> DomainError {
    DomainError::TransportIo {
        server: server.to_string(),
        reason: format!("{action}: {e}"),
    }
}

/// One query/response exchange with the two-byte length prefix (RFC 1035 §4.2.2).
/// Shared by plain TCP and TLS streams.
pub(crate) async fn exchange_framed<S>(
    stream: &mut S,
    server: SocketAddr,
    message_bytes: &[u8],
) -> Result<Vec<u8>, DomainError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let len = u16::try_from(message_bytes.len()).map_err(|_| DomainError::TransportIo {
        server: server.to_string(),
        reason: format!("message of {} bytes too large for a stream frame", message_bytes.len()),
    })?;

    let mut frame = Vec::with_capacity(message_bytes.len() + 2);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(message_bytes);
    stream
        .write_all(&frame)
        .await
        .map_err(|e| io_error(server, "write", e))?;
    stream
        .flush()
        .await
        .map_err(|e| io_error(server, "flush", e))?;
    debug!(%server, bytes_sent = frame.len(), "Framed query sent");

    let response_len = stream
        .read_u16()
        .await
        .map_err(|e| io_error(server, "read length", e))? as usize;
    let mut response = vec![0u8; response_len];
    stream
        .read_exact(&mut response)
        .await
        .map_err(|e| io_error(server, "read body", e))?;

    debug!(%server, bytes_received = response_len, "Framed response received");
    Ok(response)
}

/// DNS over TCP.
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let mut stream = TcpStream::connect(self.server_addr)
            .await
            .map_err(|e| io_error(self.server_addr, "connect", e))?;
        stream.set_nodelay(true).ok();

        exchange_framed(&mut stream, self.server_addr, message_bytes).await
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
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
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}
