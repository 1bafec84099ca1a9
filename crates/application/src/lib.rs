//! Ferrous Fanmerge Application Layer
//!
//! Ports consumed by the fan-out core plus the per-query request and context types.
pub mod context;
pub mod ports;
pub mod request;

pub use context::RequestContext;
pub use request::DnsRequest;
