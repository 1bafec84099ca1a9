pub mod dns;
pub mod query;

pub use dns::start_dns_server;
pub use query::run_query;
