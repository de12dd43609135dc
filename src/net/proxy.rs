//! Reverse-proxy runtime.
//!
//! Each connection carries one request. The `Host` header picks the virtual
//! host, the [`LoadBalancer`] picks a backend, and the original request bytes
//! are relayed to it unchanged. The backend's reply is copied back verbatim.

use std::net::SocketAddr;
use std::sync::Arc;

use async_std::net::{TcpListener, TcpStream};
use async_std::task;

use crate::config::ServerConfig;
use crate::handler;
use crate::http::parser::RequestParser;
use crate::http::response::DEFAULT_VERSION;
use crate::http::status::HttpStatus;
use crate::net::connection::{self, ReadError};
use crate::proxy::balancer::{BalancerError, LoadBalancer};
use crate::proxy::forward::forward;

pub struct ProxyServer {
    config: Arc<ServerConfig>,
    balancer: Arc<LoadBalancer>,
    parser: RequestParser,
}

impl ProxyServer {
    pub fn new(config: ServerConfig, balancer: LoadBalancer) -> Self {
        let parser = RequestParser::new(
            &config.default_document,
            config.max_header_size,
            config.max_body_size,
        );
        Self {
            config: Arc::new(config),
            balancer: Arc::new(balancer),
            parser,
        }
    }

    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind((self.config.address, self.config.port)).await?;
        self.serve(listener).await
    }

    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        tracing::info!(address = %listener.local_addr()?, "proxy listening");
        let proxy = Arc::new(self);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    task::spawn(proxy.clone().handle_client(stream, addr));
                }
                Err(err) => tracing::warn!(error = %err, "failed to accept connection"),
            }
        }
    }

    /// Picks a backend for a `Host` header value: exact match first, then the
    /// host without its port.
    fn select_backend(&self, host: &str) -> Result<&str, BalancerError> {
        match self.balancer.select(host) {
            Err(BalancerError::UnknownHost(_)) => match host.rsplit_once(':') {
                Some((bare, _)) if self.balancer.contains(bare) => self.balancer.select(bare),
                _ => Err(BalancerError::UnknownHost(host.to_string())),
            },
            selected => selected,
        }
    }

    async fn handle_client(self: Arc<Self>, mut stream: TcpStream, addr: SocketAddr) {
        let raw = match connection::read_request(
            &mut stream,
            &self.parser,
            self.config.buffer_size,
            self.config.read_timeout,
        )
        .await
        {
            Ok(raw) => raw,
            Err(ReadError::Parser(err)) => {
                tracing::warn!(%addr, error = %err, "rejecting request");
                self.reply_error(&mut stream, err.into_http_status(), DEFAULT_VERSION).await;
                return;
            }
            Err(ReadError::ConnectionClosed) => return,
            Err(err) => {
                tracing::warn!(%addr, error = %err, "dropping connection");
                return;
            }
        };

        let req = match self.parser.parse(&raw, None) {
            Ok(req) => req,
            Err(err) => {
                tracing::warn!(%addr, error = %err, "rejecting malformed request");
                self.reply_error(&mut stream, err.into_http_status(), DEFAULT_VERSION).await;
                return;
            }
        };

        let host = req.header("Host").unwrap_or_default();
        let target = match self.select_backend(host) {
            Ok(target) => target,
            Err(err) => {
                tracing::warn!(%addr, error = %err, "no backend for request");
                self.reply_error(&mut stream, HttpStatus::BadGateway, &req.version).await;
                return;
            }
        };

        tracing::info!(%addr, %host, %target, method = %req.method, path = %req.path, "forwarding request");
        let proxy = &self.config.proxy;
        match forward(target, &raw, proxy.connect_timeout, proxy.backend_timeout).await {
            Ok(reply) => {
                if let Err(err) = connection::write_response(&mut stream, &reply).await {
                    tracing::warn!(%addr, error = %err, "failed to relay backend response");
                }
            }
            Err(err) => {
                tracing::error!(%addr, error = %err, "forwarding failed");
                self.reply_error(&mut stream, HttpStatus::BadGateway, &req.version).await;
            }
        }
    }

    async fn reply_error(&self, stream: &mut TcpStream, status: HttpStatus, version: &str) {
        let bytes = handler::handle_error(status, &self.config).to_bytes(version);
        if let Err(err) = connection::write_response(stream, &bytes).await {
            tracing::warn!(error = %err, "failed to write error response");
        }
    }
}
