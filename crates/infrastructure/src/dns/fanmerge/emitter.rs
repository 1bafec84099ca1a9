use super::scheduler::FanoutOutcome;
use crate::dns::forwarding::MessageBuilder;
use ferrous_fanmerge_application::ports::ReplyWriter;
use ferrous_fanmerge_application::DnsRequest;
use ferrous_fanmerge_domain::DomainError;
use hickory_proto::op::{Message, ResponseCode};
use tracing::{debug, error, warn};

/// Turns the fan-out outcome into the reply the requester sees.
pub struct ReplyEmitter;

impl ReplyEmitter {
    /// `Err` is a server failure carrying its cause; nothing is written then.
    /// A reply that doesn't answer the question is replaced by FORMERR and
    /// still counts as handled.
    pub async fn emit(
        outcome: FanoutOutcome,
        request: &DnsRequest,
        writer: &dyn ReplyWriter,
    ) -> Result<ResponseCode, DomainError> {
        let FanoutOutcome { merged, expired } = outcome;
        let unusable = || expired.clone().unwrap_or(DomainError::NoUsableReply);

        let Some(merged) = merged else {
            return Err(unusable());
        };
        if let Some(cause) = merged.error {
            return Err(cause);
        }
        let Some(reply) = merged.reply else {
            return Err(unusable());
        };

        if let Err(mismatch) = request.validate_reply(&reply) {
            warn!(
                id = reply.id(),
                error = %mismatch,
                upstream = %merged.endpoint,
                "Wrong reply, answering FORMERR"
            );
            let formerr = MessageBuilder::error_reply(request.message(), ResponseCode::FormErr);
            Self::write_logged(writer, &formerr).await;
            return Ok(ResponseCode::NoError);
        }

        debug!(
            name = %request.name(),
            upstream = %merged.endpoint,
            answers = reply.answers().len(),
            elapsed_ms = merged.started_at.elapsed().as_millis() as u64,
            "Writing merged reply"
        );
        Self::write_logged(writer, &reply).await;
        Ok(ResponseCode::NoError)
    }

    async fn write_logged(writer: &dyn ReplyWriter, message: &Message) {
        if let Err(e) = writer.write_message(message).await {
            error!(error = %e, id = message.id(), "Failed to write reply");
        }
    }
}
