//! Route table and hook resolution.
//!
//! Routes are keyed by `(method, path)`; either component may be the
//! [`WILDCARD`] token. Resolution tries a fixed list of keys, most specific
//! first, and the first hit wins:
//!
//! 1. `(method, path)`
//! 2. `(*, path)`
//! 3. `(method, *)`
//! 4. `(*, *)`
//!
//! The table is filled by the application before the server starts and is
//! shared read-only between connection tasks afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::http::headers::HttpHeaders;

pub const WILDCARD: &str = "*";

/// Handler bound to a route. Receives the request headers and body and may
/// return a structured result that becomes the response body.
pub type Hook = Arc<dyn Fn(&HttpHeaders, &str) -> Option<Value> + Send + Sync>;

#[derive(Default, Clone)]
pub struct RouteTable {
    // method -> path -> hook
    routes: HashMap<String, HashMap<String, Hook>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `hook` for `(method, path)`.
    ///
    /// Installed entries are never replaced: registering the same key twice
    /// keeps the first hook and returns `false`.
    pub fn register<F>(&mut self, method: &str, path: &str, hook: F) -> bool
    where
        F: Fn(&HttpHeaders, &str) -> Option<Value> + Send + Sync + 'static,
    {
        let paths = self.routes.entry(method.to_string()).or_default();
        if paths.contains_key(path) {
            tracing::warn!(method, path, "route already registered, keeping the first hook");
            return false;
        }
        paths.insert(path.to_string(), Arc::new(hook));
        true
    }

    fn get(&self, method: &str, path: &str) -> Option<&Hook> {
        self.routes.get(method)?.get(path)
    }

    /// Resolves the hook for a request, applying wildcard precedence.
    pub fn resolve(&self, method: &str, path: &str) -> Option<Hook> {
        let attempts = [
            (method, path),
            (WILDCARD, path),
            (method, WILDCARD),
            (WILDCARD, WILDCARD),
        ];

        attempts.iter().find_map(|&(m, p)| {
            let hook = self.get(m, p)?;
            tracing::trace!(method, path, route_method = m, route_path = p, "hook resolved");
            Some(hook.clone())
        })
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<(&str, &str)> = self
            .routes
            .iter()
            .flat_map(|(m, paths)| paths.keys().map(move |p| (m.as_str(), p.as_str())))
            .collect();
        keys.sort();
        f.debug_struct("RouteTable").field("routes", &keys).finish()
    }
}
