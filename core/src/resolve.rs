//! Hostname resolution seam.
//!
//! Workers depend on this trait rather than the OS resolver directly,
//! so the pipeline can be exercised against scripted lookups in tests.

use std::net::IpAddr;

use async_trait::async_trait;

#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolves `host` to its addresses.
    ///
    /// A failure here is per-task: callers skip the hostname and move
    /// on, they never abort the pool.
    async fn resolve(&self, host: &str) -> anyhow::Result<Vec<IpAddr>>;
}

/// Resolver backed by the operating system, via `tokio::net::lookup_host`.
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str) -> anyhow::Result<Vec<IpAddr>> {
        // lookup_host wants a socket address; the port is discarded.
        let addrs = tokio::net::lookup_host(format!("{host}:0")).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}
