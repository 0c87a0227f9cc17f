use anyhow::{Context, Result};
use clap::Parser;
use docpull::{api, config::Config, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docpull")]
#[command(about = "File Extractor API: fetch a document by URL and return its text")]
#[command(version)]
struct Cli {
    /// Path to settings.toml (defaults to the usual search path)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to bind (overrides config and HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config and PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load().context("Failed to load configuration")?,
    }
    .apply_env()?;

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    api::serve(config, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        return;
    }
    tracing::info!("Shutting down...");
}
