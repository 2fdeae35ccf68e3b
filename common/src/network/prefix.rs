//! # Provider Prefix Model
//!
//! Represents the cloud provider's published IP ranges and answers
//! "which published blocks contain this address?".
//!
//! The [`RangeIndex`] is built once at startup and never mutated
//! afterwards, which is what lets every worker read it concurrently
//! without any locking.

use std::net::IpAddr;
use std::str::FromStr;

use ipnetwork::IpNetwork;
use thiserror::Error;

/// One CIDR block published by the provider.
///
/// `region` and `service` are carried straight from the feed document.
/// They are metadata for reporting only; membership testing looks at
/// `network` alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPrefix {
    pub network: IpNetwork,
    pub region: String,
    pub service: String,
}

#[derive(Debug, Error)]
pub enum PrefixError {
    #[error("invalid CIDR block '{block}': {source}")]
    InvalidCidr {
        block: String,
        source: ipnetwork::IpNetworkError,
    },
}

impl ProviderPrefix {
    /// Parses a CIDR-notation string into a prefix.
    pub fn parse(block: &str, region: &str, service: &str) -> Result<Self, PrefixError> {
        let network = IpNetwork::from_str(block).map_err(|source| PrefixError::InvalidCidr {
            block: block.to_string(),
            source,
        })?;

        Ok(Self {
            network,
            region: region.to_string(),
            service: service.to_string(),
        })
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.network.contains(ip)
    }
}

/// Immutable collection of provider prefixes, shared read-only by all
/// workers for the lifetime of a run.
#[derive(Debug, Default)]
pub struct RangeIndex {
    prefixes: Vec<ProviderPrefix>,
}

impl RangeIndex {
    pub fn new(prefixes: Vec<ProviderPrefix>) -> Self {
        Self { prefixes }
    }

    /// Returns every published block containing `ip`.
    ///
    /// Providers publish overlapping blocks (e.g. a service-specific
    /// prefix inside a region-wide one), so all matches are returned,
    /// not just the first. A plain linear scan is plenty for the feed's
    /// low-thousands block count.
    pub fn lookup(&self, ip: IpAddr) -> Vec<&ProviderPrefix> {
        self.prefixes
            .iter()
            .filter(|prefix| prefix.contains(ip))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
