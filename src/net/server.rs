//! Application server runtime.
//!
//! This module is responsible only for networking concerns:
//! - accepting TCP connections,
//! - reading raw bytes from the network,
//! - writing raw bytes back to the client.
//!
//! HTTP semantics are delegated to the `http` and `handler` modules.
//!
//! ## Request handling flow
//!
//! 1. Accept a TCP connection and spawn a task for it
//! 2. Read bytes until a full request has arrived
//!    (framing delegated to [`RequestParser::frame`])
//! 3. Parse the request and resolve its hook against the route table
//!    (delegated to [`RequestParser::parse`])
//! 4. Generate an [`HttpResponse`](crate::http::response::HttpResponse)
//!    (delegated to [`handler::handle_request`])
//! 5. Serialize the response, write it and close the connection
//!
//! A failure on one connection is logged and never reaches other tasks.

use std::net::SocketAddr;
use std::sync::Arc;

use async_std::net::{TcpListener, TcpStream};
use async_std::task;

use crate::config::ServerConfig;
use crate::handler;
use crate::handler::router::RouteTable;
use crate::http::parser::RequestParser;
use crate::http::response::DEFAULT_VERSION;
use crate::net::connection::{self, ReadError};

pub struct Server {
    config: Arc<ServerConfig>,
    routes: Arc<RouteTable>,
    parser: RequestParser,
}

impl Server {
    pub fn new(config: ServerConfig, routes: RouteTable) -> Self {
        let parser = RequestParser::new(
            &config.default_document,
            config.max_header_size,
            config.max_body_size,
        );
        Self {
            config: Arc::new(config),
            routes: Arc::new(routes),
            parser,
        }
    }

    /// Binds to the configured address and port, then serves forever.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind((self.config.address, self.config.port)).await?;
        self.serve(listener).await
    }

    /// Accepts connections on `listener`, spawning one task per client.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        tracing::info!(address = %listener.local_addr()?, routes = self.routes.len(), "application server listening");
        let server = Arc::new(self);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    task::spawn(server.clone().handle_client(stream, addr));
                }
                Err(err) => tracing::warn!(error = %err, "failed to accept connection"),
            }
        }
    }

    /// Handles a single client connection: one request, one response.
    async fn handle_client(self: Arc<Self>, mut stream: TcpStream, addr: SocketAddr) {
        tracing::debug!(%addr, "accepted connection");

        let raw = connection::read_request(
            &mut stream,
            &self.parser,
            self.config.buffer_size,
            self.config.read_timeout,
        )
        .await;

        let (mut response, version) = match raw {
            Ok(raw) => match self.parser.parse(&raw, Some(&self.routes)) {
                Ok(req) => {
                    let res = handler::handle_request(&req, &self.config);
                    tracing::info!(%addr, method = %req.method, path = %req.path, status = res.status.code(), "request handled");
                    (res, req.version)
                }
                Err(err) => {
                    tracing::warn!(%addr, error = %err, "rejecting malformed request");
                    (handler::handle_error(err.into_http_status(), &self.config), DEFAULT_VERSION.to_string())
                }
            },
            Err(ReadError::Parser(err)) => {
                tracing::warn!(%addr, error = %err, "rejecting request");
                (handler::handle_error(err.into_http_status(), &self.config), DEFAULT_VERSION.to_string())
            }
            Err(ReadError::ConnectionClosed) => return,
            Err(err) => {
                tracing::warn!(%addr, error = %err, "dropping connection");
                return;
            }
        };

        let bytes = response.to_bytes(&version);
        if let Err(err) = connection::write_response(&mut stream, &bytes).await {
            tracing::warn!(%addr, error = %err, "failed to write response");
        }
    }
}
