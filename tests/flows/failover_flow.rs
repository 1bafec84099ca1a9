#[path = "../common/mod.rs"]
mod common;
use common::{build_chain, config, query, CapturingWriter, ScriptedUpstream, UpstreamScript};

use ferrous_fanmerge_application::ports::DnsHandler;
use ferrous_fanmerge_application::RequestContext;
use ferrous_fanmerge_domain::DomainError;
use hickory_proto::op::ResponseCode;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

fn ip(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(203, 0, 113, last)
}

// ============================================================================
// Retries
// ============================================================================

#[tokio::test]
async fn test_dropped_query_is_retried() {
    let flaky = ScriptedUpstream::start(UpstreamScript::answering(&[ip(1)]).dropping_first(1))
        .await
        .expect("Failed to start upstream");
    let chain = build_chain(&config(
        &[flaky.endpoint()],
        "timeout_ms = 200\nattempts = 3\nattempt_delay_ms = 20",
    ));
    let writer = CapturingWriter::default();

    chain
        .serve_dns(&RequestContext::background(), &writer, &query("example.org"))
        .await
        .expect("second attempt answers");

    assert_eq!(writer.addresses(), vec![ip(1)]);
    assert_eq!(flaky.queries(), 2);
}

#[tokio::test]
async fn test_servfail_upstream_does_not_spoil_good_answer() {
    let good = ScriptedUpstream::start(UpstreamScript::answering(&[ip(1)]))
        .await
        .expect("Failed to start upstream");
    let broken = ScriptedUpstream::start(UpstreamScript::rcode(ResponseCode::ServFail))
        .await
        .expect("Failed to start upstream");
    let chain = build_chain(&config(
        &[good.endpoint(), broken.endpoint()],
        "attempts = 3\nattempt_delay_ms = 100",
    ));
    let writer = CapturingWriter::default();

    chain
        .serve_dns(&RequestContext::background(), &writer, &query("example.org"))
        .await
        .expect("good upstream answers");

    assert_eq!(writer.addresses(), vec![ip(1)]);
    assert_eq!(broken.queries(), 3);
}

// ============================================================================
// Server failures
// ============================================================================

#[tokio::test]
async fn test_all_upstreams_down() {
    let first = ScriptedUpstream::start(UpstreamScript::silent())
        .await
        .expect("Failed to start upstream");
    let second = ScriptedUpstream::start(UpstreamScript::silent())
        .await
        .expect("Failed to start upstream");
    let chain = build_chain(&config(
        &[first.endpoint(), second.endpoint()],
        "timeout_ms = 100\nattempts = 2\nattempt_delay_ms = 10",
    ));
    let writer = CapturingWriter::default();

    let result = chain
        .serve_dns(&RequestContext::background(), &writer, &query("example.org"))
        .await;

    assert_eq!(result, Err(DomainError::AttemptLimitReached));
    assert!(writer.is_empty());
    assert_eq!(first.queries(), 2);
    assert_eq!(second.queries(), 2);
}

#[tokio::test]
async fn test_deadline_bounds_silent_upstreams() {
    let good = ScriptedUpstream::start(UpstreamScript::answering(&[ip(7)]))
        .await
        .expect("Failed to start upstream");
    let silent = ScriptedUpstream::start(UpstreamScript::silent())
        .await
        .expect("Failed to start upstream");
    let chain = build_chain(&config(
        &[good.endpoint(), silent.endpoint()],
        "timeout_ms = 5000\nattempts = 0\ndeadline_ms = 300",
    ));
    let writer = CapturingWriter::default();
    let started = Instant::now();

    let rcode = chain
        .serve_dns(&RequestContext::background(), &writer, &query("example.org"))
        .await
        .expect("answer from responsive upstream");

    assert_eq!(rcode, ResponseCode::NoError);
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(writer.addresses(), vec![ip(7)]);
}

#[tokio::test]
async fn test_cancelled_parent_stops_fanout() {
    let silent = ScriptedUpstream::start(UpstreamScript::silent())
        .await
        .expect("Failed to start upstream");
    let chain = build_chain(&config(&[silent.endpoint()], "timeout_ms = 5000"));
    let writer = CapturingWriter::default();
    let parent = RequestContext::background();

    let canceller = parent.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let result = chain.serve_dns(&parent, &writer, &query("example.org")).await;

    assert_eq!(result, Err(DomainError::Cancelled));
    assert!(writer.is_empty());
}
