use crate::http::cookies::CookieJar;
use crate::http::headers::HttpHeaders;
use crate::http::status::HttpStatus;

/// Version written on responses to requests whose version is unknown.
pub const DEFAULT_VERSION: &str = "HTTP/1.1";

pub enum ResponseHeader {
    ContentLength,
    ContentType,
    ContentEncoding,
    Connection,
    Date,
    Server,
    SetCookie,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: HttpStatus,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,

    /// Path the response was served for, after any internal redirect.
    pub path: Option<String>,
    /// Cookies set by the server on this response.
    pub cookies: CookieJar,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self::with_status(HttpStatus::Ok)
    }

    pub fn with_status(status: HttpStatus) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: Vec::new(),
            path: None,
            cookies: CookieJar::new(),
        }
    }

    pub fn set_header(&mut self, h: ResponseHeader, value: &str) {
        let name = match h {
            ResponseHeader::ContentType => "Content-Type",
            ResponseHeader::ContentLength => "Content-Length",
            ResponseHeader::ContentEncoding => "Content-Encoding",
            ResponseHeader::Connection => "Connection",
            ResponseHeader::Date => "Date",
            ResponseHeader::Server => "Server",
            ResponseHeader::SetCookie => "Set-Cookie",
        };

        self.headers.set_raw(name, value);
    }

    pub fn set_body(&mut self, content_type: &str, body: impl Into<Vec<u8>>) {
        self.set_header(ResponseHeader::ContentType, content_type);
        self.body = body.into();
    }

    /// Sets a cookie on the client and records it in [`HttpResponse::cookies`].
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.set_header(ResponseHeader::SetCookie, &format!("{}={}", name, value));
        self.cookies.insert(name, value);
    }

    /// Character encoding of a textual body: the `charset=` parameter of
    /// `Content-Type`, or `utf-8` when there is none.
    pub fn encoding(&self) -> String {
        self.headers
            .get("Content-Type")
            .and_then(|ct| ct.split_once("charset="))
            .map(|(_, rest)| rest.split(';').next().unwrap_or(rest).trim().to_string())
            .unwrap_or_else(|| "utf-8".to_string())
    }

    /// Sets `Content-Length` from the current body. An empty body yields `0`.
    pub fn finalize(&mut self) {
        let len = self.body.len().to_string();
        self.set_header(ResponseHeader::ContentLength, &len);
    }

    pub fn build_headers(&self, version: &str) -> String {
        // <version> <status> <reason>\r\n
        // <header_name>: <header_value>\r\n
        // ...
        // \r\n
        format!(
            "{} {} {}\r\n{}\r\n",
            version,
            self.status.code(),
            self.status.reason(),
            self.headers.stringify(),
        )
    }

    /// Serializes the response to wire bytes, setting `Content-Length` first.
    pub fn to_bytes(&mut self, version: &str) -> Vec<u8> {
        self.finalize();
        let mut bytes = self.build_headers(version).into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}
