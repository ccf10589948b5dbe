//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod output;

pub use job::JobCommands;
pub use output::OutputCommands;

use anyhow::{Context, Result};
use clap::Subcommand;
use lofi_client::ServiceClient;
use lofi_controller::JobController;
use std::sync::Arc;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job submission and history
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Rendered videos stored on the service
    Output {
        #[command(subcommand)]
        command: OutputCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let controller = build_controller(config)?;

    match command {
        Commands::Job { command } => job::handle_job_command(command, &controller).await,
        Commands::Output { command } => output::handle_output_command(command, &controller).await,
    }
}

/// Wires the HTTP transport into a lifecycle controller
fn build_controller(config: &Config) -> Result<JobController> {
    let http_client = reqwest::Client::builder()
        .connect_timeout(config.controller.request_timeout)
        // Per read, so long downloads still work while stalled ones fail
        .read_timeout(config.controller.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let client = ServiceClient::with_client(&config.api_url, &config.token, http_client);

    Ok(JobController::new(Arc::new(client), config.controller.clone()))
}
