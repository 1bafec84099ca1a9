use crate::dns::forwarding::MessageBuilder;
use async_trait::async_trait;
use ferrous_fanmerge_application::ports::{DnsHandler, ReplyWriter};
use ferrous_fanmerge_application::{DnsRequest, RequestContext};
use ferrous_fanmerge_domain::DomainError;
use hickory_proto::op::ResponseCode;
use tracing::{debug, error};

/// End of the chain: answers REFUSED to anything that reaches it.
#[derive(Debug, Default)]
pub struct RefusedHandler;

#[async_trait]
impl DnsHandler for RefusedHandler {
    fn name(&self) -> &str {
        "refused"
    }

    async fn serve_dns(
        &self,
        _ctx: &RequestContext,
        writer: &dyn ReplyWriter,
        request: &DnsRequest,
    ) -> Result<ResponseCode, DomainError> {
        debug!(name = %request.name(), "Refusing query");
        let reply = MessageBuilder::error_reply(request.message(), ResponseCode::Refused);
        if let Err(e) = writer.write_message(&reply).await {
            error!(error = %e, id = reply.id(), "Failed to write REFUSED");
        }
        Ok(ResponseCode::Refused)
    }
}
