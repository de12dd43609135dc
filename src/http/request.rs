use std::borrow::Cow;

use crate::handler::router::Hook;
use crate::http::cookies::CookieJar;
use crate::http::headers::HttpHeaders;

/// A parsed request.
///
/// Produced by [`RequestParser`](crate::http::parser::RequestParser) and owned by
/// the connection task that read it. Path rewriting and hook resolution have
/// already happened by the time any handler sees it.
#[derive(Default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub version: String,

    pub headers: HttpHeaders,
    pub cookies: CookieJar,
    pub body: Vec<u8>,

    /// Route hook resolved for `(method, path)`, if a route table was supplied.
    pub hook: Option<Hook>,
}

impl HttpRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name)
    }
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("version", &self.version)
            .field("headers", &self.headers)
            .field("cookies", &self.cookies)
            .field("body_len", &self.body.len())
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
