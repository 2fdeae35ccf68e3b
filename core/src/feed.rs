//! # Provider IP-Range Feed
//!
//! Retrieves AWS's published `ip-ranges.json` document and builds the
//! [`RangeIndex`] the workers consult.
//!
//! This is the only part of a run allowed to fail fatally: without the
//! provider's ranges every membership test would be meaningless, so any
//! fetch or decode problem aborts before a single hostname is read.

use std::time::Duration;

use anyhow::{Context, ensure};
use cloudsift_common::network::prefix::{ProviderPrefix, RangeIndex};
use serde::Deserialize;
use tracing::warn;

/// Published location of the AWS IP-range document.
pub const IP_RANGES_URL: &str = "https://ip-ranges.amazonaws.com/ip-ranges.json";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct IpRangesDocument {
    #[serde(default)]
    prefixes: Vec<Ipv4Entry>,
    #[serde(default)]
    ipv6_prefixes: Vec<Ipv6Entry>,
}

#[derive(Debug, Deserialize)]
struct Ipv4Entry {
    ip_prefix: String,
    region: String,
    service: String,
}

#[derive(Debug, Deserialize)]
struct Ipv6Entry {
    ipv6_prefix: String,
    region: String,
    service: String,
}

/// Fetches the published document and builds the index.
pub async fn fetch() -> anyhow::Result<RangeIndex> {
    fetch_from(IP_RANGES_URL).await
}

/// Same as [`fetch`], against an explicit URL.
pub async fn fetch_from(url: &str) -> anyhow::Result<RangeIndex> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("building feed HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("requesting provider IP ranges from {url}"))?
        .error_for_status()
        .context("provider IP-range feed returned an error status")?;

    let document = response
        .text()
        .await
        .context("reading provider IP-range feed body")?;

    parse(&document)
}

/// Decodes an `ip-ranges.json` document into a [`RangeIndex`].
///
/// Individual malformed CIDR entries are dropped with a warning; a
/// document yielding no usable prefix at all is an error.
pub fn parse(document: &str) -> anyhow::Result<RangeIndex> {
    let doc: IpRangesDocument =
        serde_json::from_str(document).context("decoding provider IP-range document")?;

    let mut prefixes = Vec::with_capacity(doc.prefixes.len() + doc.ipv6_prefixes.len());

    for entry in &doc.prefixes {
        match ProviderPrefix::parse(&entry.ip_prefix, &entry.region, &entry.service) {
            Ok(prefix) => prefixes.push(prefix),
            Err(err) => warn!("skipping malformed feed entry: {err}"),
        }
    }

    for entry in &doc.ipv6_prefixes {
        match ProviderPrefix::parse(&entry.ipv6_prefix, &entry.region, &entry.service) {
            Ok(prefix) => prefixes.push(prefix),
            Err(err) => warn!("skipping malformed feed entry: {err}"),
        }
    }

    ensure!(
        !prefixes.is_empty(),
        "provider IP-range document contained no usable prefixes"
    );

    Ok(RangeIndex::new(prefixes))
}
