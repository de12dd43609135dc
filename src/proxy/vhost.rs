//! Virtual-host configuration.
//!
//! The file is a sequence of blocks:
//!
//! ```text
//! host "app.local" {
//!     proxy_pass http://127.0.0.1:9001;
//!     proxy_pass http://127.0.0.1:9002;
//!     dist_policy round-robin
//! }
//! ```
//!
//! A block without any `proxy_pass` is kept with an empty target list; the
//! balancer rejects it at selection time.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static HOST_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"host\s+"([^"]+)"\s*\{([^}]*)\}"#).expect("valid regex"));
static PROXY_PASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"proxy_pass\s+http://([^\s;]+);").expect("valid regex"));
static DIST_POLICY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"dist_policy\s+([\w-]+)").expect("valid regex"));

#[derive(Debug, Error)]
pub enum VhostError {
    #[error("failed to read virtual hosts from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DistPolicy {
    #[default]
    RoundRobin,
    /// Always the first configured target.
    First,
    /// Unrecognized name; selects like [`DistPolicy::First`].
    Unknown(String),
}

impl DistPolicy {
    pub fn from_name(name: &str) -> Self {
        match name {
            "round-robin" => DistPolicy::RoundRobin,
            "first" => DistPolicy::First,
            other => DistPolicy::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualHost {
    pub host: String,
    /// Backend addresses (`host:port`), in declaration order.
    pub targets: Vec<String>,
    pub policy: DistPolicy,
}

/// Virtual hosts keyed by host identifier, in file order.
/// A host declared twice keeps the last block.
pub type VirtualHosts = IndexMap<String, VirtualHost>;

pub fn parse_virtual_hosts(text: &str) -> VirtualHosts {
    let mut hosts = VirtualHosts::new();

    for block in HOST_BLOCK.captures_iter(text) {
        let host = block[1].to_string();
        let body = &block[2];

        let targets: Vec<String> = PROXY_PASS
            .captures_iter(body)
            .map(|c| c[1].to_string())
            .collect();
        let policy = DIST_POLICY
            .captures(body)
            .map(|c| DistPolicy::from_name(&c[1]))
            .unwrap_or_default();

        if targets.is_empty() {
            tracing::warn!(%host, "virtual host has no proxy_pass targets");
        }
        if let DistPolicy::Unknown(name) = &policy {
            tracing::warn!(%host, policy = %name, "unknown dist_policy, first target will always be used");
        }
        tracing::info!(%host, ?targets, ?policy, "loaded virtual host");

        hosts.insert(host.clone(), VirtualHost { host, targets, policy });
    }

    hosts
}

pub fn load_virtual_hosts(path: impl AsRef<Path>) -> Result<VirtualHosts, VhostError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| VhostError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_virtual_hosts(&text))
}
