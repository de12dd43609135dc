use flate2::Compression;
use flate2::write::{DeflateEncoder, GzEncoder};
use std::io::Write;
use std::time::SystemTime;

use crate::http::request::HttpRequest;
use crate::http::response::{HttpResponse, ResponseHeader};

// Content codings this server can produce, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    Gzip,
    Deflate,
}

impl CompressionAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionAlgorithm::Gzip => "gzip",
            CompressionAlgorithm::Deflate => "deflate",
        }
    }

    /// Picks the preferred coding listed in an `Accept-Encoding` value.
    pub fn negotiate(accept_encoding: &str) -> Option<Self> {
        let offered: Vec<&str> = accept_encoding
            .split(',')
            .map(|coding| coding.split(';').next().unwrap_or_default().trim())
            .collect();

        [CompressionAlgorithm::Gzip, CompressionAlgorithm::Deflate]
            .into_iter()
            .find(|algo| offered.iter().any(|c| c.eq_ignore_ascii_case(algo.as_str())))
    }
}

/// Decorates every outgoing response: `Server`, `Date` and `Connection: close`
/// headers, and body compression when the client accepts it.
pub fn apply(req: &HttpRequest, res: &mut HttpResponse, server_name: &str) {
    res.set_header(ResponseHeader::Server, server_name);
    res.set_header(ResponseHeader::Date, &httpdate::fmt_http_date(SystemTime::now()));
    // one request per connection
    res.set_header(ResponseHeader::Connection, "close");

    if res.body.is_empty() {
        return;
    }
    let Some(algo) = req
        .header("Accept-Encoding")
        .and_then(CompressionAlgorithm::negotiate)
    else {
        return;
    };

    if let Err(err) = compress_body(res, algo) {
        tracing::warn!(error = %err, algorithm = algo.as_str(), "compression failed, sending identity body");
    }
}

fn compress_body(res: &mut HttpResponse, algo: CompressionAlgorithm) -> std::io::Result<()> {
    let compressed = match algo {
        CompressionAlgorithm::Gzip => {
            let mut e = GzEncoder::new(Vec::new(), Compression::default());
            e.write_all(&res.body)?;
            e.finish()?
        }
        CompressionAlgorithm::Deflate => {
            let mut e = DeflateEncoder::new(Vec::new(), Compression::default());
            e.write_all(&res.body)?;
            e.finish()?
        }
    };

    res.body = compressed;
    res.set_header(ResponseHeader::ContentEncoding, algo.as_str());
    res.finalize();
    Ok(())
}
