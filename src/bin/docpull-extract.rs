use anyhow::{Context, Result};
use clap::Parser;
use docpull::{
    api::{build_pipeline, ErrorResponse, ExtractResponse},
    config::Config,
    logging,
    models::FetchRequest,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "docpull-extract")]
#[command(about = "Extract the text of one remote document")]
#[command(version)]
struct Cli {
    /// Document URL (http or https)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to settings.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the JSON envelope instead of the bare text
    #[arg(long)]
    json: bool,

    /// Maximum download size in bytes (overrides config)
    #[arg(long, value_name = "BYTES")]
    max_file_size: Option<u64>,

    /// Download timeout in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    logging::init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load().unwrap_or_default(),
    }
    .apply_env()?;

    if let Some(max) = cli.max_file_size {
        config.fetch.max_file_size = max;
    }
    if let Some(secs) = cli.timeout {
        config.fetch.request_timeout_secs = secs;
    }

    let pipeline = build_pipeline(&config)?;

    match pipeline.extract(&FetchRequest::new(cli.url)).await {
        Ok(extraction) => {
            if cli.json {
                let body = serde_json::to_string_pretty(&ExtractResponse::from(extraction))
                    .context("Failed to serialize result")?;
                println!("{}", body);
            } else {
                println!("{}", extraction.content);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if cli.json {
                let body = ErrorResponse {
                    error: e.to_string(),
                    file_type: e.file_type().map(str::to_string),
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&body).context("Failed to serialize error")?
                );
            } else {
                eprintln!("Error: {}", e);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
