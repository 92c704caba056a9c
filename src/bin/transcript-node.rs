#![forbid(unsafe_code)]
//! HTTP node for TranscriptChain

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use transcriptchain::api::{run_api_server, ApiState};
use transcriptchain::config::{load_config, DEFAULT_CONFIG_PATH};
use transcriptchain::ledger::Ledger;
use transcriptchain::logging::{init_logging, LogFormat};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    /// Address to bind, overrides server.host
    #[arg(long)]
    host: Option<String>,
    /// Port to bind, overrides server.port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    init_logging(&config.logging.level, LogFormat::from_str_lossy(&config.logging.format))
        .map_err(|e| format!("Failed to initialise logging: {}", e))?;

    let ip: IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| format!("Invalid server.host {:?}: {}", config.server.host, e))?;
    let addr = SocketAddr::new(ip, config.server.port);

    let ledger = Ledger::new();
    tracing::info!(
        genesis = %ledger.chain().last_block().hash_hex(),
        "Starting TranscriptChain node"
    );

    run_api_server(ApiState::new(ledger), addr).await
}
