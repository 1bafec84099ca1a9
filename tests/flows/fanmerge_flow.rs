#[path = "../common/mod.rs"]
mod common;
use common::{build_chain, config, query, CapturingWriter, ScriptedUpstream, UpstreamScript};

use ferrous_fanmerge_application::ports::DnsHandler;
use ferrous_fanmerge_application::RequestContext;
use hickory_proto::op::ResponseCode;
use std::net::Ipv4Addr;

fn ip(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(198, 51, 100, last)
}

// ============================================================================
// Complete fan-out / merge flow
// ============================================================================

#[tokio::test]
async fn test_answers_from_every_upstream_are_merged() {
    let first = ScriptedUpstream::start(UpstreamScript::answering(&[ip(1)]))
        .await
        .expect("Failed to start upstream");
    let second = ScriptedUpstream::start(UpstreamScript::answering(&[ip(2), ip(3)]))
        .await
        .expect("Failed to start upstream");
    let chain = build_chain(&config(&[first.endpoint(), second.endpoint()], ""));
    let writer = CapturingWriter::default();
    let request = query("www.example.org");

    let rcode = chain
        .serve_dns(&RequestContext::background(), &writer, &request)
        .await
        .expect("query succeeds");

    assert_eq!(rcode, ResponseCode::NoError);
    assert_eq!(writer.addresses(), vec![ip(1), ip(2), ip(3)]);
    let reply = writer.single();
    assert_eq!(reply.id(), request.id());
    assert!(request.matches(&reply));
    assert_eq!(first.queries(), 1);
    assert_eq!(second.queries(), 1);
}

#[tokio::test]
async fn test_single_upstream_passes_through() {
    let only = ScriptedUpstream::start(UpstreamScript::answering(&[ip(9)]))
        .await
        .expect("Failed to start upstream");
    let chain = build_chain(&config(&[format!("udp://{}", only.addr())], ""));
    let writer = CapturingWriter::default();

    chain
        .serve_dns(&RequestContext::background(), &writer, &query("example.org"))
        .await
        .expect("query succeeds");

    assert_eq!(writer.addresses(), vec![ip(9)]);
}

#[tokio::test]
async fn test_nxdomain_is_relayed_from_lone_upstream() {
    let only = ScriptedUpstream::start(UpstreamScript::rcode(ResponseCode::NXDomain))
        .await
        .expect("Failed to start upstream");
    let chain = build_chain(&config(&[only.endpoint()], ""));
    let writer = CapturingWriter::default();

    let rcode = chain
        .serve_dns(&RequestContext::background(), &writer, &query("missing.example.org"))
        .await
        .expect("query handled");

    assert_eq!(rcode, ResponseCode::NoError);
    assert_eq!(writer.single().response_code(), ResponseCode::NXDomain);
}

// ============================================================================
// Eligibility
// ============================================================================

#[tokio::test]
async fn test_names_outside_zone_are_refused() {
    let upstream = ScriptedUpstream::start(UpstreamScript::answering(&[ip(1)]))
        .await
        .expect("Failed to start upstream");
    let chain = build_chain(&config(&[upstream.endpoint()], "from = \"example.org\""));
    let writer = CapturingWriter::default();

    let rcode = chain
        .serve_dns(&RequestContext::background(), &writer, &query("example.net"))
        .await
        .expect("query handled");

    assert_eq!(rcode, ResponseCode::Refused);
    assert_eq!(writer.single().response_code(), ResponseCode::Refused);
    assert_eq!(upstream.queries(), 0);
}

#[tokio::test]
async fn test_excluded_subdomain_is_refused() {
    let upstream = ScriptedUpstream::start(UpstreamScript::answering(&[ip(1)]))
        .await
        .expect("Failed to start upstream");
    let chain = build_chain(&config(
        &[upstream.endpoint()],
        "except = [\"internal.example.org\"]",
    ));
    let writer = CapturingWriter::default();

    let rcode = chain
        .serve_dns(
            &RequestContext::background(),
            &writer,
            &query("db.internal.example.org"),
        )
        .await
        .expect("query handled");

    assert_eq!(rcode, ResponseCode::Refused);
    assert_eq!(upstream.queries(), 0);
}
