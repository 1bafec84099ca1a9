use async_trait::async_trait;
use ferrous_fanmerge_application::ports::{DnsHandler, ReplyWriter};
use ferrous_fanmerge_application::{DnsRequest, RequestContext};
use ferrous_fanmerge_domain::config::ServerConfig;
use ferrous_fanmerge_domain::DomainError;
use ferrous_fanmerge_infrastructure::dns::forwarding::MessageBuilder;
use hickory_proto::op::{Message, ResponseCode};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

const MAX_UDP_PAYLOAD: usize = 4096;
const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

struct UdpReplyWriter {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    /// Largest datagram the requester accepts
    max_payload: usize,
}

#[async_trait]
impl ReplyWriter for UdpReplyWriter {
    async fn write_message(&self, message: &Message) -> Result<(), DomainError> {
        let bytes = MessageBuilder::to_wire_within(message, self.max_payload)?;
        self.socket
            .send_to(&bytes, self.peer)
            .await
            .map_err(|e| DomainError::ReplyWriteFailed(e.to_string()))?;
        Ok(())
    }
}

struct TcpReplyWriter {
    stream: Mutex<OwnedWriteHalf>,
}

#[async_trait]
impl ReplyWriter for TcpReplyWriter {
    async fn write_message(&self, message: &Message) -> Result<(), DomainError> {
        let bytes = MessageBuilder::to_wire(message)?;
        let len = u16::try_from(bytes.len())
            .map_err(|_| DomainError::ReplyWriteFailed("reply exceeds 65535 bytes".into()))?;

        let mut frame = Vec::with_capacity(bytes.len() + 2);
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(&bytes);

        self.stream
            .lock()
            .await
            .write_all(&frame)
            .await
            .map_err(|e| DomainError::ReplyWriteFailed(e.to_string()))
    }
}

/// Run one query through the chain; a chain failure is answered with SERVFAIL.
async fn dispatch(
    handler: &dyn DnsHandler,
    ctx: &RequestContext,
    writer: &dyn ReplyWriter,
    request: DnsRequest,
) {
    match handler.serve_dns(ctx, writer, &request).await {
        Ok(rcode) => {
            debug!(name = %request.name(), %rcode, "Query handled");
        }
        Err(e) => {
            warn!(name = %request.name(), error = %e, "Query failed, answering SERVFAIL");
            let reply = MessageBuilder::error_reply(request.message(), ResponseCode::ServFail);
            if let Err(e) = writer.write_message(&reply).await {
                error!(error = %e, "Failed to write SERVFAIL");
            }
        }
    }
}

async fn serve_udp(socket: Arc<UdpSocket>, handler: Arc<dyn DnsHandler>, root: RequestContext) {
    let mut buf = vec![0u8; MAX_UDP_PAYLOAD];

    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                warn!(error = %e, "UDP receive failed");
                continue;
            }
        };

        let message = match MessageBuilder::from_wire(&buf[..len]) {
            Ok(message) => message,
            Err(e) => {
                debug!(%peer, error = %e, "Dropping malformed UDP query");
                continue;
            }
        };

        let writer = UdpReplyWriter {
            socket: Arc::clone(&socket),
            peer,
            max_payload: MessageBuilder::udp_payload_limit(&message),
        };
        let handler = Arc::clone(&handler);
        let ctx = root.with_cancel();
        tokio::spawn(async move {
            let request = DnsRequest::new(message).with_source(peer);
            dispatch(handler.as_ref(), &ctx, &writer, request).await;
        });
    }
}

async fn serve_tcp_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<dyn DnsHandler>,
    root: RequestContext,
    idle: Duration,
) {
    let (mut reader, write_half) = stream.into_split();
    let writer = TcpReplyWriter {
        stream: Mutex::new(write_half),
    };

    loop {
        let len = match tokio::time::timeout(idle, reader.read_u16()).await {
            Ok(Ok(len)) => len,
            Ok(Err(_)) | Err(_) => break,
        };

        let mut query = vec![0u8; usize::from(len)];
        match tokio::time::timeout(idle, reader.read_exact(&mut query)).await {
            Ok(Ok(_)) => {}
            Ok(Err(_)) => break,
            Err(_) => {
                debug!(%peer, expected = len, "Query body not received in time");
                break;
            }
        }

        let message = match MessageBuilder::from_wire(&query) {
            Ok(message) => message,
            Err(e) => {
                debug!(%peer, error = %e, "Closing connection after malformed query");
                break;
            }
        };

        let request = DnsRequest::new(message).with_source(peer);
        dispatch(handler.as_ref(), &root.with_cancel(), &writer, request).await;
    }

    debug!(%peer, "TCP connection closed");
}

async fn serve_tcp(listener: TcpListener, handler: Arc<dyn DnsHandler>, root: RequestContext) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tokio::spawn(serve_tcp_connection(
                    stream,
                    peer,
                    Arc::clone(&handler),
                    root.clone(),
                    TCP_IDLE_TIMEOUT,
                ));
            }
            Err(e) => warn!(error = %e, "TCP accept failed"),
        }
    }
}

pub async fn start_dns_server(
    config: &ServerConfig,
    handler: Arc<dyn DnsHandler>,
) -> anyhow::Result<()> {
    let ip: IpAddr = config.bind_address.parse()?;
    let socket_addr = SocketAddr::new(ip, config.dns_port);

    info!(bind_address = %socket_addr, handler = handler.name(), "Starting DNS server");

    let udp_socket = Arc::new(UdpSocket::bind(socket_addr).await?);
    info!(protocol = "UDP", "DNS server listening");

    let tcp_listener = TcpListener::bind(socket_addr).await?;
    info!(protocol = "TCP", "DNS server listening");

    let root = RequestContext::background();
    let _shutdown = root.cancel_on_drop();

    info!("DNS server ready to accept queries");

    tokio::select! {
        _ = serve_udp(udp_socket, Arc::clone(&handler), root.clone()) => {}
        _ = serve_tcp(tcp_listener, handler, root.clone()) => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
