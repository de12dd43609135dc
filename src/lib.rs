//! Request routing and dispatch over raw TCP.
//!
//! - [`http`]: wire-level request parsing and response serialization
//! - [`handler`]: session gate, route table with wildcard precedence, static files
//! - [`proxy`]: virtual hosts, per-host round-robin balancing, forwarding
//! - [`net`]: connection acceptors for the application server and the proxy

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logging;
pub mod net;
pub mod proxy;

pub use app::App;
pub use config::ServerConfig;
pub use error::{Error, Result};
