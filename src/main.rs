use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pvcast::{AppState, OpenMeteoClient, PvcastConfig, telemetry, web};

#[derive(Debug, Parser)]
#[command(name = "pvcast", version, about = "Weather forecast gateway with PV energy estimates")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,

    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PvcastConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    let _telemetry = telemetry::init(&config.logging)?;

    tracing::info!(
        version = pvcast::VERSION,
        upstream = %config.upstream.base_url,
        timeout_s = config.upstream.timeout_seconds,
        "Starting PvCast"
    );
    tracing::debug!(?config, "Effective configuration");

    let client = OpenMeteoClient::from_config(&config.upstream)?;
    let state = AppState::from_config(Arc::new(client), &config);

    web::run(state, &config.server).await
}
