//! Backend selection per virtual host.
//!
//! Each host owns its rotation cursor. The cursor starts at zero when the
//! balancer is built and is never reset; a selection reads it, advances it
//! modulo the target count and writes it back under the host's lock.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::proxy::vhost::{DistPolicy, VirtualHosts};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BalancerError {
    #[error("unknown virtual host {0:?}")]
    UnknownHost(String),

    #[error("virtual host {0:?} has no backend targets")]
    NoTargets(String),
}

#[derive(Debug)]
struct HostPool {
    targets: Vec<String>,
    policy: DistPolicy,
    cursor: Mutex<usize>,
}

impl HostPool {
    fn next_target(&self) -> &str {
        if self.targets.len() == 1 {
            return &self.targets[0];
        }

        match self.policy {
            DistPolicy::RoundRobin => {
                let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
                let index = *cursor;
                *cursor = (index + 1) % self.targets.len();
                &self.targets[index]
            }
            DistPolicy::First | DistPolicy::Unknown(_) => &self.targets[0],
        }
    }
}

/// Shared by every proxy connection task for the lifetime of the process.
#[derive(Debug, Default)]
pub struct LoadBalancer {
    hosts: HashMap<String, HostPool>,
}

impl LoadBalancer {
    pub fn new(vhosts: VirtualHosts) -> Self {
        let hosts = vhosts
            .into_values()
            .map(|vhost| {
                let pool = HostPool {
                    targets: vhost.targets,
                    policy: vhost.policy,
                    cursor: Mutex::new(0),
                };
                (vhost.host, pool)
            })
            .collect();

        Self { hosts }
    }

    /// Returns the next backend target for `host`.
    pub fn select(&self, host: &str) -> Result<&str, BalancerError> {
        let pool = self
            .hosts
            .get(host)
            .ok_or_else(|| BalancerError::UnknownHost(host.to_string()))?;

        if pool.targets.is_empty() {
            return Err(BalancerError::NoTargets(host.to_string()));
        }

        let target = pool.next_target();
        tracing::debug!(%host, %target, "selected backend");
        Ok(target)
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains_key(host)
    }
}
