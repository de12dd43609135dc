use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use relaynet::net::proxy::ProxyServer;
use relaynet::proxy::balancer::LoadBalancer;
use relaynet::proxy::vhost::load_virtual_hosts;
use relaynet::{ServerConfig, logging};

#[derive(Parser)]
#[command(name = "relaynet-proxy", about = "Reverse proxy with per-host round-robin balancing")]
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

    /// Virtual host definitions (overrides `proxy.vhost_file`)
    #[arg(long)]
    vhosts: Option<PathBuf>,
}

#[async_std::main]
async fn main() -> relaynet::Result<()> {
    logging::init("relaynet=info");
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(ip) = cli.server_ip {
        config.address = ip;
    }
    if let Some(port) = cli.server_port {
        config.port = port;
    }
    if let Some(vhosts) = cli.vhosts {
        config.proxy.vhost_file = vhosts;
    }

    let vhosts = load_virtual_hosts(&config.proxy.vhost_file)?;
    tracing::info!(hosts = vhosts.len(), file = %config.proxy.vhost_file.display(), "virtual hosts loaded");

    ProxyServer::new(config, LoadBalancer::new(vhosts)).run().await?;
    Ok(())
}
