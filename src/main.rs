use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use relaynet::{App, ServerConfig, logging};
use serde_json::json;

const DEFAULT_PORT: u16 = 8000;

#[derive(Parser)]
#[command(name = "relaynet", about = "Application server with route hooks and a cookie session gate")]
struct Cli {
    /// Address to bind (overrides the config file)
    #[arg(long)]
    server_ip: Option<IpAddr>,

    /// Port to bind (overrides the config file)
    #[arg(long)]
    server_port: Option<u16>,

    /// TOML server configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[async_std::main]
async fn main() -> relaynet::Result<()> {
    logging::init("relaynet=info");
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig {
            port: DEFAULT_PORT,
            ..ServerConfig::default()
        },
    };
    if let Some(ip) = cli.server_ip {
        config.address = ip;
    }
    if let Some(port) = cli.server_port {
        config.port = port;
    }

    let app = App::new()
        .route("PUT", "/hello", |headers, body| {
            tracing::info!(host = ?headers.get("Host"), %body, "hello");
            Some(json!({ "message": "hello", "body": body }))
        })
        .route("GET", "/api/status", |_, _| {
            Some(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
        })
        .route("POST", "/echo", |headers, body| {
            Some(json!({
                "content_type": headers.get("Content-Type"),
                "body": body,
            }))
        });

    app.run(config).await?;
    Ok(())
}
