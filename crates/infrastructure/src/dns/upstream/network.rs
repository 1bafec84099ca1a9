use crate::dns::forwarding::MessageBuilder;
use crate::dns::transport::Transport;
use async_trait::async_trait;
use ferrous_fanmerge_application::ports::UpstreamClient;
use ferrous_fanmerge_application::{DnsRequest, RequestContext};
use ferrous_fanmerge_domain::{DomainError, NetworkKind};
use hickory_proto::op::{Message, ResponseCode};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Upstream resolver reached over UDP, TCP or TLS.
pub struct NetworkUpstream {
    addr: SocketAddr,
    network: NetworkKind,
    timeout: Duration,
    transport: Transport,
    label: String,
}

impl NetworkUpstream {
    pub fn new(addr: SocketAddr, network: NetworkKind, timeout: Duration) -> Self {
        Self {
            addr,
            network,
            timeout,
            transport: Transport::new(addr, network),
            label: format!("{}://{}", network, addr),
        }
    }

    /// Certificate name for TLS upstreams; other transports ignore it.
    pub fn with_tls_server_name(mut self, server_name: Option<String>) -> Self {
        if self.network == NetworkKind::Tls {
            self.transport = Transport::tls(self.addr, server_name);
        }
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn network(&self) -> NetworkKind {
        self.network
    }

    /// Per-attempt timeout, shortened to what is left of the context.
    fn attempt_timeout(&self, ctx: &RequestContext) -> Duration {
        ctx.remaining()
            .map_or(self.timeout, |left| left.min(self.timeout))
    }

    /// What is left of `timeout` since `start`.
    fn remaining_budget(timeout: Duration, start: Instant) -> Duration {
        timeout.saturating_sub(start.elapsed())
    }

    async fn exchange(
        &self,
        transport: &Transport,
        wire: &[u8],
        timeout: Duration,
    ) -> Result<Message, DomainError> {
        let response = transport.send(wire, timeout).await?;
        MessageBuilder::from_wire(&response.bytes)
    }

    fn is_server_error(rcode: ResponseCode) -> bool {
        matches!(
            rcode,
            ResponseCode::ServFail | ResponseCode::Refused | ResponseCode::NotImp
        )
    }
}

#[async_trait]
impl UpstreamClient for NetworkUpstream {
    async fn request(
        &self,
        ctx: &RequestContext,
        request: &DnsRequest,
    ) -> Result<Message, DomainError> {
        let start = Instant::now();
        let wire = MessageBuilder::to_wire(request.message())?;
        let timeout = self.attempt_timeout(ctx);

        let mut reply = tokio::select! {
            cause = ctx.done() => return Err(cause),
            reply = self.exchange(&self.transport, &wire, timeout) => reply?,
        };

        if reply.truncated() && self.network == NetworkKind::Udp {
            debug!(server = %self.addr, "Response truncated (TC bit), retrying via TCP");
            let tcp = Transport::new(self.addr, NetworkKind::Tcp);
            let remaining = Self::remaining_budget(timeout, start);
            reply = tokio::select! {
                cause = ctx.done() => return Err(cause),
                reply = self.exchange(&tcp, &wire, remaining) => reply?,
            };
        }

        let rcode = reply.response_code();
        debug!(
            server = %self.label,
            protocol = self.transport.protocol_name(),
            rcode = %rcode,
            answers = reply.answers().len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Upstream exchange complete"
        );

        if Self::is_server_error(rcode) {
            return Err(DomainError::UpstreamServerError {
                server: self.label.clone(),
                rcode: rcode.to_string(),
            });
        }
        Ok(reply)
    }

    fn endpoint(&self) -> &str {
        &self.label
    }
}
