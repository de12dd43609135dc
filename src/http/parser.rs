//! Request parsing.
//!
//! Parsing is split in two steps:
//!
//! - [`RequestParser::frame`] inspects bytes accumulated so far from a
//!   connection and tells the reader whether a full request has arrived
//!   (head terminated by a blank line, plus `Content-Length` body bytes).
//! - [`RequestParser::parse`] turns one complete buffer into an
//!   [`HttpRequest`]. It never touches the connection; the caller decides how
//!   to answer a [`ParseError`].

use thiserror::Error;

use crate::handler::router::RouteTable;
use crate::http::cookies::CookieJar;
use crate::http::request::HttpRequest;
use crate::http::status::HttpStatus;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request line")]
    MalformedRequestLine,

    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    #[error("declared body of {0} bytes exceeds the limit")]
    BodyTooLarge(usize),

    #[error("invalid Content-Length value {0:?}")]
    InvalidContentLength(String),
}

impl ParseError {
    // To keep parser logic separate from HTTP status codes,
    // errors are mapped to a status only when a response is built.
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            ParseError::MalformedRequestLine => HttpStatus::BadRequest,
            ParseError::InvalidContentLength(_) => HttpStatus::BadRequest,
            ParseError::HeadTooLarge(_) => HttpStatus::RequestHeaderFieldsTooLarge,
            ParseError::BodyTooLarge(_) => HttpStatus::PayloadTooLarge,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParserOutcome {
    /// More bytes are needed.
    Incomplete,
    /// The first `n` bytes of the buffer hold a full request.
    Done(usize),
}

#[derive(Debug, Clone)]
pub struct RequestParser {
    default_document: String,
    max_header_size: usize,
    max_body_size: usize,
}

impl RequestParser {
    pub fn new(default_document: &str, max_header_size: usize, max_body_size: usize) -> Self {
        Self {
            default_document: default_document.to_string(),
            max_header_size,
            max_body_size,
        }
    }

    /// Decides whether `buf` holds a complete request.
    ///
    /// Without a `Content-Length` header, everything received after the head
    /// is taken as the body.
    pub fn frame(&self, buf: &[u8]) -> Result<ParserOutcome, ParseError> {
        let head_end = match find(buf, HEAD_TERMINATOR) {
            Some(end) => end,
            None if buf.len() > self.max_header_size => {
                return Err(ParseError::HeadTooLarge(self.max_header_size));
            }
            None => return Ok(ParserOutcome::Incomplete),
        };

        if head_end > self.max_header_size {
            return Err(ParseError::HeadTooLarge(self.max_header_size));
        }

        let head = String::from_utf8_lossy(&buf[..head_end]);
        let content_length = head
            .split("\r\n")
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .last()
            .map(|(_, value)| {
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidContentLength(value.trim().to_string()))
            })
            .transpose()?;

        let body_start = head_end + HEAD_TERMINATOR.len();
        match content_length {
            Some(len) if len > self.max_body_size => Err(ParseError::BodyTooLarge(len)),
            Some(len) if buf.len() >= body_start + len => Ok(ParserOutcome::Done(body_start + len)),
            Some(_) => Ok(ParserOutcome::Incomplete),
            None => Ok(ParserOutcome::Done(buf.len())),
        }
    }

    /// Parses one complete request buffer.
    ///
    /// When `routes` is given, the request's hook is resolved against it after
    /// the path has been rewritten.
    pub fn parse(&self, buf: &[u8], routes: Option<&RouteTable>) -> Result<HttpRequest, ParseError> {
        let (head, body) = match find(buf, HEAD_TERMINATOR) {
            Some(end) => (&buf[..end], &buf[end + HEAD_TERMINATOR.len()..]),
            None => (buf, &[][..]),
        };
        let head = String::from_utf8_lossy(head);
        let mut lines = head.split("\r\n");

        // Request line: METHOD PATH VERSION
        let request_line = lines.next().unwrap_or_default();
        let parts: Vec<&str> = request_line.split_whitespace().collect();
        let [method, path, version] = parts[..] else {
            return Err(ParseError::MalformedRequestLine);
        };

        let mut req = HttpRequest::new();
        req.method = method.to_string();
        req.path = if path == "/" {
            self.default_document.clone()
        } else {
            path.to_string()
        };
        req.version = version.to_string();

        for line in lines {
            if let Some((name, value)) = line.split_once(": ") {
                req.headers.set_raw(name, value);
            }
        }

        req.cookies = req
            .headers
            .get("cookie")
            .map(CookieJar::from_header)
            .unwrap_or_default();
        req.body = body.to_vec();
        req.hook = routes.and_then(|table| table.resolve(&req.method, &req.path));

        tracing::debug!(method = %req.method, path = %req.path, version = %req.version, "parsed request");
        Ok(req)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser() -> RequestParser {
        RequestParser::new("/index.html", 8192, 1024)
    }

    #[test]
    fn test_request_line_and_headers() {
        let raw = b"GET /hello HTTP/1.1\r\nHost: localhost\r\nContent-Type: text/plain\r\n\r\n";
        let req = parser().parse(raw, None).unwrap();

        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/hello");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.header("host"), Some("localhost"));
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("text/plain"));
        assert!(req.body.is_empty());
        assert!(req.hook.is_none());
    }

    #[test]
    fn test_root_is_rewritten_to_default_document() {
        let req = parser().parse(b"GET / HTTP/1.0\r\n\r\n", None).unwrap();
        assert_eq!(req.path, "/index.html");

        let req = parser().parse(b"GET /other/ HTTP/1.0\r\n\r\n", None).unwrap();
        assert_eq!(req.path, "/other/");
    }

    #[test]
    fn test_malformed_request_line() {
        assert_eq!(
            parser().parse(b"GET /only-two\r\n\r\n", None).unwrap_err(),
            ParseError::MalformedRequestLine
        );
        assert_eq!(
            parser().parse(b"GET / HTTP/1.1 extra\r\n\r\n", None).unwrap_err(),
            ParseError::MalformedRequestLine
        );
        assert_eq!(
            parser().parse(b"", None).unwrap_err(),
            ParseError::MalformedRequestLine
        );
    }

    #[test]
    fn test_lines_without_separator_are_ignored_and_last_wins() {
        let raw = b"GET /x HTTP/1.1\r\nbroken line\r\nX-Id: 1\r\nNoSpace:2\r\nx-id: 3\r\n\r\n";
        let req = parser().parse(raw, None).unwrap();

        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("X-Id"), Some("3"));
        assert_eq!(req.header("NoSpace"), None);
    }

    #[test]
    fn test_cookies_and_body() {
        let raw = b"POST /login HTTP/1.1\r\nCookie: a=1; junk; b=2\r\n\r\nusername=admin&password=x";
        let req = parser().parse(raw, None).unwrap();

        assert_eq!(req.cookies.len(), 2);
        assert_eq!(req.cookie("a"), Some("1"));
        assert_eq!(req.cookie("b"), Some("2"));
        assert_eq!(req.body_str(), "username=admin&password=x");
    }

    #[test]
    fn test_hook_resolved_when_routes_supplied() {
        let mut routes = RouteTable::new();
        routes.register("GET", "/index.html", |_, _| Some(json!("index")));

        let req = parser().parse(b"GET / HTTP/1.1\r\n\r\n", Some(&routes)).unwrap();
        let hook = req.hook.as_ref().expect("hook resolved for rewritten path");
        assert_eq!(hook(&req.headers, ""), Some(json!("index")));

        let req = parser().parse(b"GET /missing HTTP/1.1\r\n\r\n", Some(&routes)).unwrap();
        assert!(req.hook.is_none());
    }

    #[test]
    fn test_frame_waits_for_head_and_body() {
        let p = parser();
        assert_eq!(p.frame(b"GET / HTTP/1.1\r\nHost: a\r\n").unwrap(), ParserOutcome::Incomplete);
        assert_eq!(
            p.frame(b"GET / HTTP/1.1\r\n\r\n").unwrap(),
            ParserOutcome::Done(18)
        );

        let partial = b"POST /x HTTP/1.1\r\ncontent-length: 5\r\n\r\nab";
        assert_eq!(p.frame(partial).unwrap(), ParserOutcome::Incomplete);

        let full = b"POST /x HTTP/1.1\r\ncontent-length: 5\r\n\r\nabcdeTRAILING";
        assert_eq!(p.frame(full).unwrap(), ParserOutcome::Done(full.len() - 8));
    }

    #[test]
    fn test_frame_limits() {
        let p = RequestParser::new("/index.html", 16, 4);
        assert_eq!(
            p.frame(b"GET /a-very-long-path-indeed HTTP/1.1\r\n").unwrap_err(),
            ParseError::HeadTooLarge(16)
        );

        let p = RequestParser::new("/index.html", 1024, 4);
        assert_eq!(
            p.frame(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\n").unwrap_err(),
            ParseError::BodyTooLarge(10)
        );
        assert_eq!(
            p.frame(b"POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n").unwrap_err(),
            ParseError::InvalidContentLength("ten".to_string())
        );
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(ParseError::MalformedRequestLine.into_http_status(), HttpStatus::BadRequest);
        assert_eq!(ParseError::BodyTooLarge(1).into_http_status(), HttpStatus::PayloadTooLarge);
    }
}
