use async_trait::async_trait;
use ferrous_fanmerge_domain::DomainError;
use hickory_proto::op::Message;

/// Sends the final reply back to whoever asked.
#[async_trait]
pub trait ReplyWriter: Send + Sync {
    async fn write_message(&self, message: &Message) -> Result<(), DomainError>;
}
