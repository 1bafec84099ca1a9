use super::ReplyWriter;
use crate::{DnsRequest, RequestContext};
use async_trait::async_trait;
use ferrous_fanmerge_domain::DomainError;
use hickory_proto::op::ResponseCode;
use std::sync::Arc;

/// A link in the query handling chain.
///
/// `Ok(rcode)` means the handler dealt with the query (and wrote a reply when
/// it had one to write). `Err` is a server failure carrying its cause.
#[async_trait]
pub trait DnsHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn serve_dns(
        &self,
        ctx: &RequestContext,
        writer: &dyn ReplyWriter,
        request: &DnsRequest,
    ) -> Result<ResponseCode, DomainError>;
}

/// Hand the query to `next`, or fail when the chain ends at `name`.
pub async fn next_or_failure(
    name: &str,
    next: Option<&Arc<dyn DnsHandler>>,
    ctx: &RequestContext,
    writer: &dyn ReplyWriter,
    request: &DnsRequest,
) -> Result<ResponseCode, DomainError> {
    match next {
        Some(handler) => handler.serve_dns(ctx, writer, request).await,
        None => Err(DomainError::NoNextHandler(name.to_string())),
    }
}
