#![allow(dead_code)]

pub use fixtures::{build_chain, config, query, CapturingWriter};
pub use test_server::{ScriptedUpstream, UpstreamScript};
