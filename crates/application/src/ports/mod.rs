pub mod dns_handler;
pub mod reply_writer;
pub mod upstream_client;

pub use dns_handler::{next_or_failure, DnsHandler};
pub use reply_writer::ReplyWriter;
pub use upstream_client::UpstreamClient;
