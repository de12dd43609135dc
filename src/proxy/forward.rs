//! Relaying one request to a backend.

use std::time::Duration;

use async_std::io;
use async_std::net::TcpStream;
use async_std::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to connect to backend {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while talking to backend {target}: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// Sends `request` verbatim to `target` and returns everything the backend
/// writes until it closes the connection.
///
/// With a `read_timeout`, a backend that goes quiet for that long ends the
/// reply: whatever it sent so far is returned, and a backend that sent
/// nothing is an error. There is no retry: a failure is reported once to
/// the caller.
pub async fn forward(
    target: &str,
    request: &[u8],
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
) -> Result<Vec<u8>, ForwardError> {
    let connect = TcpStream::connect(target);
    let connected = match connect_timeout {
        Some(limit) => io::timeout(limit, connect).await,
        None => connect.await,
    };
    let mut backend = connected.map_err(|source| ForwardError::Connect {
        target: target.to_string(),
        source,
    })?;

    let io_err = |source| ForwardError::Io {
        target: target.to_string(),
        source,
    };

    backend.write_all(request).await.map_err(io_err)?;

    let mut response = Vec::new();
    let mut buf = vec![0; 4096];
    loop {
        let read = match read_timeout {
            Some(limit) => io::timeout(limit, backend.read(&mut buf)).await,
            None => backend.read(&mut buf).await,
        };
        match read {
            Ok(0) => break,
            Ok(n) => response.extend_from_slice(&buf[..n]),
            Err(err) if err.kind() == io::ErrorKind::TimedOut && !response.is_empty() => {
                tracing::debug!(%target, "backend idle, ending reply");
                break;
            }
            Err(err) => return Err(io_err(err)),
        }
    }

    tracing::debug!(%target, bytes = response.len(), "backend responded");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_std::net::TcpListener;
    use async_std::task;

    /// Backend that answers once with `reply` and then holds the connection
    /// open without closing it.
    async fn lingering_backend(reply: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        task::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0; 1024];
            let _ = stream.read(&mut buf).await;
            if !reply.is_empty() {
                let _ = stream.write_all(reply.as_bytes()).await;
            }
            task::sleep(Duration::from_secs(10)).await;
            drop(stream);
        });
        addr
    }

    #[async_std::test]
    async fn test_idle_backend_reply_is_returned() {
        let reply = "HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok";
        let target = lingering_backend(reply).await;

        let response = forward(
            &target,
            b"GET / HTTP/1.1\r\n\r\n",
            Some(Duration::from_secs(1)),
            Some(Duration::from_millis(200)),
        )
        .await
        .unwrap();
        assert_eq!(response, reply.as_bytes());
    }

    #[async_std::test]
    async fn test_silent_backend_times_out() {
        let target = lingering_backend("").await;

        let err = forward(
            &target,
            b"GET / HTTP/1.1\r\n\r\n",
            Some(Duration::from_secs(1)),
            Some(Duration::from_millis(200)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ForwardError::Io { .. }), "{err}");
    }
}
