//! # Probe Engine
//!
//! Fingerprints one hostname with a single HTTP GET.
//!
//! The distinctive CloudFront misconfiguration answers a direct
//! request with `403 Forbidden` and a body containing the literal
//! text `Bad request`. Anything else, including any transport-level
//! failure, is "no finding".

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::StatusCode;
use tracing::debug;

use crate::report::{Report, ReportSink};

/// Case-sensitive body substring that confirms the misconfiguration.
const SIGNATURE: &str = "Bad request";

/// Per-request ceiling. The legacy behavior was to block forever on a
/// hung host; a bounded wait keeps one dead host from pinning a worker.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Prober {
    client: reqwest::Client,
    verbose: bool,
    sink: Arc<dyn ReportSink>,
}

impl Prober {
    pub fn new(verbose: bool, sink: Arc<dyn ReportSink>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building probe HTTP client")?;

        Ok(Self {
            client,
            verbose,
            sink,
        })
    }

    /// Runs the detection sequence against one hostname.
    ///
    /// Every early exit means "no finding"; none of them is an error
    /// from the pool's point of view.
    pub async fn probe(&self, hostname: &str) {
        let url = normalize(hostname);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!("request to {url} failed: {err}");
                return;
            }
        };

        let status = response.status();
        if self.verbose {
            self.sink.emit(Report::Diagnostic {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        if status != StatusCode::FORBIDDEN {
            return;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                if self.verbose {
                    debug!("reading response body for {url} failed: {err}");
                }
                return;
            }
        };

        if body.contains(SIGNATURE) {
            self.sink.emit(Report::Finding { url });
        }
    }
}

/// Prepends the insecure scheme unless the input already carries one.
///
/// No TLS is negotiated for bare hostnames; the signature shows up on
/// plain HTTP just as well.
fn normalize(hostname: &str) -> String {
    if hostname.starts_with("http://") || hostname.starts_with("https://") {
        hostname.to_string()
    } else {
        format!("http://{hostname}")
    }
}
