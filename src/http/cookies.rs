//! Cookie set derived from the `Cookie` request header.
//!
//! The set is computed once per request and never mutated afterwards.
//! Responses reuse the same type to record cookies set by the server.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: IndexMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `Cookie` header value such as `a=1; b=2`.
    ///
    /// Pairs are split on `;`, then on the first `=`. Names and values are
    /// trimmed; pairs without `=` are skipped.
    pub fn from_header(header: &str) -> Self {
        let mut cookies = IndexMap::new();
        for pair in header.split(';') {
            if let Some((name, value)) = pair.split_once('=') {
                cookies.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
        Self { cookies }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub(crate) fn insert(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}
