use async_trait::async_trait;
use ferrous_fanmerge_application::ports::{DnsHandler, ReplyWriter};
use ferrous_fanmerge_application::{DnsRequest, RequestContext};
use ferrous_fanmerge_domain::DomainError;
use ferrous_fanmerge_infrastructure::dns::forwarding::MessageBuilder;
use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use std::sync::Arc;
use tracing::info;

/// Prints the reply in a dig-like layout.
struct StdoutWriter;

#[async_trait]
impl ReplyWriter for StdoutWriter {
    async fn write_message(&self, message: &Message) -> Result<(), DomainError> {
        println!(
            ";; id: {}, status: {}, answers: {}",
            message.id(),
            message.response_code(),
            message.answers().len()
        );
        for query in message.queries() {
            println!(";{} {} {}", query.name(), query.query_class(), query.query_type());
        }
        for record in message.answers() {
            println!("{record}");
        }
        Ok(())
    }
}

/// Resolve `name` once through the chain and print what comes back.
pub async fn run_query(
    handler: Arc<dyn DnsHandler>,
    name: &str,
    record_type: &str,
) -> anyhow::Result<()> {
    let record_type: RecordType = record_type
        .to_ascii_uppercase()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid record type '{record_type}': {e}"))?;
    let message = MessageBuilder::build_query(name, record_type)?;
    let request = DnsRequest::new(message);

    info!(name = %request.name(), qtype = %record_type, "Resolving");

    let ctx = RequestContext::background();
    match handler.serve_dns(&ctx, &StdoutWriter, &request).await {
        Ok(rcode) => {
            info!(%rcode, "Query handled");
            Ok(())
        }
        Err(e) => anyhow::bail!("server failure: {e}"),
    }
}
