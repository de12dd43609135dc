//! Reading one request from, and writing one response to, a client stream.

use std::time::Duration;

use async_std::io;
use async_std::net::TcpStream;
use async_std::prelude::*;
use thiserror::Error;

use crate::http::parser::{ParseError, ParserOutcome, RequestParser};

/// Errors that can occur while reading a request from the stream,
/// used to interrupt the flow and choose an appropriate response.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error while reading request: {0}")]
    Io(#[source] std::io::Error),

    #[error("connection closed before a request was received")]
    ConnectionClosed,

    #[error("read timed out")]
    TimedOut,

    #[error(transparent)]
    Parser(#[from] ParseError),
}

/// Accumulates bytes until `parser` reports a complete request and returns
/// exactly those bytes.
///
/// If the peer closes the stream mid-request, whatever arrived is returned and
/// left for the parser to accept or reject. `read_timeout` bounds each read;
/// `None` blocks until the peer sends or closes.
pub async fn read_request(
    stream: &mut TcpStream,
    parser: &RequestParser,
    buffer_size: usize,
    read_timeout: Option<Duration>,
) -> Result<Vec<u8>, ReadError> {
    let mut data = Vec::new();
    let mut buffer = vec![0; buffer_size];

    loop {
        let read = stream.read(&mut buffer);
        let result = match read_timeout {
            Some(limit) => io::timeout(limit, read).await,
            None => read.await,
        };

        let n = match result {
            Ok(0) if data.is_empty() => return Err(ReadError::ConnectionClosed),
            Ok(0) => return Ok(data),
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => return Err(ReadError::TimedOut),
            Err(e) => return Err(ReadError::Io(e)),
        };

        data.extend_from_slice(&buffer[..n]);
        match parser.frame(&data)? {
            ParserOutcome::Incomplete => continue,
            ParserOutcome::Done(len) => {
                data.truncate(len);
                return Ok(data);
            }
        }
    }
}

/// Writes `bytes` and flushes. The caller closes the stream by dropping it.
pub async fn write_response(stream: &mut TcpStream, bytes: &[u8]) -> std::io::Result<()> {
    stream.write_all(bytes).await?;
    stream.flush().await
}
