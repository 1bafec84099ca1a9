#![allow(dead_code)]
pub mod builders;
pub mod dns_server_mock;
pub mod mock_upstreams;

pub use builders::{RecordBuilder, RequestBuilder};
pub use dns_server_mock::{MockBehaviour, MockDnsServer};
pub use mock_upstreams::{MockUpstream, RecordingWriter};
