//! Output command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use lofi_controller::JobController;

/// Output subcommands
#[derive(Subcommand)]
pub enum OutputCommands {
    /// List rendered videos available for download
    List,
}

/// Handle output commands
pub async fn handle_output_command(
    command: OutputCommands,
    controller: &JobController,
) -> Result<()> {
    match command {
        OutputCommands::List => list_outputs(controller).await,
    }
}

async fn list_outputs(controller: &JobController) -> Result<()> {
    let videos = controller
        .outputs()
        .await
        .context("Failed to list rendered videos")?;

    if videos.is_empty() {
        println!("{}", "No rendered videos yet.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} video(s):", videos.len()).bold());
    for video in videos {
        println!("  {} {}", "▸".cyan(), video);
    }

    Ok(())
}
