//! Route registration surface for applications.

use async_std::net::TcpListener;
use serde_json::Value;

use crate::config::ServerConfig;
use crate::handler::router::RouteTable;
use crate::http::headers::HttpHeaders;
use crate::net::server::Server;

/// Collects hooks, then runs them behind the application server.
///
/// ```no_run
/// use relaynet::app::App;
/// use relaynet::config::ServerConfig;
/// use serde_json::json;
///
/// # async_std::task::block_on(async {
/// App::new()
///     .route("PUT", "/hello", |_, body| Some(json!({ "hello": body })))
///     .route("*", "/ping", |_, _| Some(json!("pong")))
///     .run(ServerConfig::default())
///     .await
/// # }).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct App {
    routes: RouteTable,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hook` for `(method, path)`; either may be `*`.
    pub fn route<F>(mut self, method: &str, path: &str, hook: F) -> Self
    where
        F: Fn(&HttpHeaders, &str) -> Option<Value> + Send + Sync + 'static,
    {
        self.routes.register(method, path, hook);
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn into_server(self, config: ServerConfig) -> Server {
        Server::new(config, self.routes)
    }

    pub async fn run(self, config: ServerConfig) -> std::io::Result<()> {
        self.into_server(config).run().await
    }

    pub async fn serve(self, config: ServerConfig, listener: TcpListener) -> std::io::Result<()> {
        self.into_server(config).serve(listener).await
    }
}
