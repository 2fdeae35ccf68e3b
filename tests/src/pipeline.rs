#![cfg(test)]
//! End-to-end pipeline scenarios with scripted DNS and a mock origin.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use cloudsift_common::network::prefix::{ProviderPrefix, RangeIndex};
use cloudsift_core::pipeline::Pipeline;
use cloudsift_core::probe::Prober;
use cloudsift_core::report::MemorySink;
use cloudsift_core::resolve::Resolver;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Resolver answering from a fixed table; unknown hosts fail like NXDOMAIN.
struct ScriptedResolver {
    table: HashMap<String, Vec<IpAddr>>,
    lookups: AtomicUsize,
}

impl ScriptedResolver {
    fn new(entries: &[(&str, &[&str])]) -> Self {
        let table = entries
            .iter()
            .map(|(host, ips)| {
                let ips = ips.iter().map(|ip| ip.parse().unwrap()).collect();
                (host.to_string(), ips)
            })
            .collect();
        Self {
            table,
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Resolver for ScriptedResolver {
    async fn resolve(&self, host: &str) -> anyhow::Result<Vec<IpAddr>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.table
            .get(host)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such host: {host}"))
    }
}

/// Index owning a documentation-range block standing in for AWS space.
fn aws_index() -> Arc<RangeIndex> {
    Arc::new(RangeIndex::new(vec![
        ProviderPrefix::parse("203.0.113.0/24", "us-east-1", "CLOUDFRONT").unwrap(),
    ]))
}

async fn misconfigured_origin() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("ERROR: Bad request"))
        .mount(&server)
        .await;
    server
}

async fn run_scenario(
    concurrency: usize,
    resolver: Arc<ScriptedResolver>,
    input: &str,
) -> Arc<MemorySink> {
    let sink = Arc::new(MemorySink::new());
    let prober = Arc::new(Prober::new(false, sink.clone()).unwrap());
    let pipeline = Pipeline::new(concurrency, aws_index(), resolver, prober);
    pipeline.run(input.as_bytes()).await.unwrap();
    sink
}

/// One host sits in provider space behind a misconfigured origin,
/// the other resolves outside it and must never even be probed.
#[tokio::test]
async fn only_hosts_in_provider_space_are_probed_and_reported() {
    let origin = misconfigured_origin().await;
    let origin_host = origin.uri().trim_start_matches("http://").to_string();

    let resolver = Arc::new(ScriptedResolver::new(&[
        (origin_host.as_str(), &["203.0.113.10"]),
        ("b.example.com", &["192.0.2.44"]),
    ]));

    let input = format!("{origin_host}\nb.example.com\n");
    let sink = run_scenario(4, resolver.clone(), &input).await;

    assert_eq!(sink.findings(), vec![origin.uri()]);
    assert_eq!(resolver.lookups.load(Ordering::SeqCst), 2);
    // Only one request can have reached the mock origin.
    assert_eq!(origin.received_requests().await.unwrap().len(), 1);
}

/// A hostname with several addresses inside provider space is still
/// probed exactly once.
#[tokio::test]
async fn multiple_matching_addresses_probe_once() {
    let origin = misconfigured_origin().await;
    let origin_host = origin.uri().trim_start_matches("http://").to_string();

    let resolver = Arc::new(ScriptedResolver::new(&[(
        origin_host.as_str(),
        &["203.0.113.10", "203.0.113.11", "203.0.113.12"],
    )]));

    let sink = run_scenario(4, resolver, &format!("{origin_host}\n")).await;

    assert_eq!(sink.findings(), vec![origin.uri()]);
    assert_eq!(origin.received_requests().await.unwrap().len(), 1);
}

/// Worker count changes throughput, never the set of findings.
#[tokio::test]
async fn findings_are_invariant_under_concurrency() {
    let origin = misconfigured_origin().await;
    let origin_host = origin.uri().trim_start_matches("http://").to_string();
    let alias_host = origin_host.replace("127.0.0.1", "localhost");

    let entries: Vec<(&str, &[&str])> = vec![
        (origin_host.as_str(), &["203.0.113.10"]),
        (alias_host.as_str(), &["203.0.113.20"]),
        ("outside.example.com", &["198.51.100.1"]),
        ("unresolvable.example.com", &[]),
    ];
    let input = format!("{origin_host}\n{alias_host}\noutside.example.com\nnxdomain.example.com\n");

    let mut outcomes = Vec::new();
    for concurrency in [1, 8] {
        let resolver = Arc::new(ScriptedResolver::new(&entries));
        let sink = run_scenario(concurrency, resolver, &input).await;
        let mut findings = sink.findings();
        findings.sort();
        outcomes.push(findings);
    }

    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(
        outcomes[0],
        vec![
            origin.uri(),
            origin.uri().replace("127.0.0.1", "localhost")
        ]
    );
}

/// A well-behaved origin (403 without the signature) is never reported.
#[tokio::test]
async fn hardened_origin_produces_no_finding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Access Denied"))
        .mount(&server)
        .await;
    let host = server.uri().trim_start_matches("http://").to_string();

    let resolver = Arc::new(ScriptedResolver::new(&[(host.as_str(), &["203.0.113.5"])]));
    let sink = run_scenario(2, resolver, &format!("{host}\n")).await;

    assert!(sink.findings().is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
