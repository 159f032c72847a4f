//! MCP OAuth Server - Entry Point

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mcp_oauth::{config::Config, server::AuthServer};

#[derive(Parser, Debug)]
#[command(name = "mcp-oauth")]
#[command(about = "OAuth 2.0 authorization server for MCP clients")]
#[command(version)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// HTTP server port
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

fn parse_host(host: &str) -> anyhow::Result<[u8; 4]> {
    let addr: std::net::Ipv4Addr = host.parse()?;
    Ok(addr.octets())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cli.port,
        "Starting MCP OAuth server"
    );

    let config = Config::from_env()?;
    let host = parse_host(&cli.host)?;

    AuthServer::new(config).run(host, cli.port).await
}
