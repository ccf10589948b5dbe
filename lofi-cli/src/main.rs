//! Lofi CLI
//!
//! Command-line front end for the Lofi Maker processing service: submit a
//! looping background video with audio links, follow the job, browse the
//! history and download results.

mod commands;
mod config;
mod id_resolver;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lofi")]
#[command(about = "Lofi Maker: loop a video over your playlists", long_about = None)]
struct Cli {
    /// Processing service URL
    #[arg(long, env = "LOFI_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Bearer token for the processing service
    #[arg(long, env = "LOFI_API_TOKEN", hide_env_values = true)]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lofi_controller=warn,lofi_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.api_url, cli.token)?;
    debug!(
        "Using processing service at {} (poll every {:?})",
        config.api_url, config.controller.poll_interval
    );

    handle_command(cli.command, &config).await
}
