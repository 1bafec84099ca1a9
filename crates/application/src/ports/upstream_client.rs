use crate::{DnsRequest, RequestContext};
use async_trait::async_trait;
use ferrous_fanmerge_domain::DomainError;
use hickory_proto::op::Message;

/// One upstream resolver.
///
/// A call performs a single round trip. Implementations apply their own
/// protocol timeout and must give up once `ctx` ends.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn request(
        &self,
        ctx: &RequestContext,
        request: &DnsRequest,
    ) -> Result<Message, DomainError>;

    /// Label identifying the upstream in logs and results.
    fn endpoint(&self) -> &str;
}
