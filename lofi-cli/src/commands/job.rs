//! Job command handlers
//!
//! Handles submission, following a job to completion, history listing and
//! result downloads.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use lofi_controller::{JobController, JobPhase, LifecycleEvent};
use lofi_core::{Job, JobId, JobStatus, VideoAsset, parse_sources};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast::error::TryRecvError;

use crate::id_resolver::resolve_job_id;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Submit a background video and audio links
    Submit {
        /// MP4 video to loop in the background
        #[arg(short, long)]
        video: PathBuf,

        /// Comma separated audio links
        #[arg(short, long)]
        sources: String,

        /// Return right after the job is created
        #[arg(short, long)]
        detach: bool,
    },
    /// List the job history
    List {
        /// Print the history as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get job details
    Get {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Follow a job until it finishes
    Watch {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Download the video of a completed job
    Download {
        /// Job ID or unambiguous prefix
        id: String,

        /// Destination file (defaults to the result file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle job commands
///
/// Routes job subcommands to their respective handlers.
pub async fn handle_job_command(command: JobCommands, controller: &JobController) -> Result<()> {
    match command {
        JobCommands::Submit {
            video,
            sources,
            detach,
        } => submit_job(controller, &video, &sources, detach).await,
        JobCommands::List { json } => list_jobs(controller, json).await,
        JobCommands::Get { id } => get_job(controller, &id).await,
        JobCommands::Watch { id } => watch_job(controller, &id).await,
        JobCommands::Download { id, output } => download_job(controller, &id, output).await,
    }
}

/// Submit a job and optionally follow it
async fn submit_job(
    controller: &JobController,
    video: &Path,
    sources: &str,
    detach: bool,
) -> Result<()> {
    let bytes = tokio::fs::read(video)
        .await
        .with_context(|| format!("Failed to read video {}", video.display()))?;
    let file_name = video
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video.mp4".to_string());

    println!("{}", "Uploading files...".dimmed());
    let job_id = controller
        .submit(VideoAsset::new(file_name, bytes), parse_sources(sources))
        .await?;

    println!("{} Job {} created", "✓".green(), job_id.to_string().cyan());

    if detach {
        println!(
            "{}",
            format!("Follow it with: lofi job watch {}", job_id).dimmed()
        );
        return Ok(());
    }

    follow_job(controller, &job_id).await
}

/// List the job history
async fn list_jobs(controller: &JobController, json: bool) -> Result<()> {
    controller
        .refresh()
        .await
        .context("Failed to load job history")?;
    let jobs = controller.store().snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&*jobs)?);
        return Ok(());
    }

    if jobs.is_empty() {
        println!("{}", "No videos created yet.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs.iter() {
            print_job_summary(controller, job);
        }
    }

    Ok(())
}

/// Get and display a single job
async fn get_job(controller: &JobController, id: &str) -> Result<()> {
    let job = find_job(controller, id).await?;

    print_job_details(controller, &job);

    Ok(())
}

/// Follow an existing job until it finishes
async fn watch_job(controller: &JobController, id: &str) -> Result<()> {
    let job = find_job(controller, id).await?;

    if job.status().is_terminal() {
        print_job_details(controller, &job);
        return Ok(());
    }

    controller.watch(&job.id);
    follow_job(controller, &job.id).await
}

/// Download the result of a completed job
async fn download_job(controller: &JobController, id: &str, output: Option<PathBuf>) -> Result<()> {
    let job = find_job(controller, id).await?;

    let bytes = controller
        .download(&job)
        .await
        .with_context(|| format!("Failed to download result of job {}", job.id))?;

    let path = match (output, job.result_locator()) {
        (Some(path), _) => path,
        (None, Some(locator)) => PathBuf::from(locator),
        (None, None) => PathBuf::from(format!("{}.mp4", job.id)),
    };

    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} Saved {} ({} bytes)",
        "✓".green(),
        path.display().to_string().cyan(),
        bytes.len()
    );

    Ok(())
}

/// Refresh history and look a job up by ID or prefix
async fn find_job(controller: &JobController, id: &str) -> Result<Job> {
    controller
        .refresh()
        .await
        .context("Failed to load job history")?;

    let jobs = controller.store().snapshot();
    let job_id = resolve_job_id(&jobs, id)?;

    controller
        .store()
        .get(&job_id)
        .with_context(|| format!("Job {} disappeared from history", job_id))
}

/// Print lifecycle events until the job's polling loop ends
///
/// Ctrl-C stops following; the job itself keeps running on the service.
async fn follow_job(controller: &JobController, job_id: &JobId) -> Result<()> {
    let mut events = controller.subscribe();
    let mut status = controller.status();
    let mut last_message = String::new();

    let wait = controller.wait(job_id);
    tokio::pin!(wait);

    let phase = loop {
        tokio::select! {
            phase = &mut wait => break phase,
            _ = tokio::signal::ctrl_c() => {
                controller.cancel(job_id);
            }
            changed = status.changed() => {
                if changed.is_err() {
                    continue;
                }
                let line = status.borrow_and_update().clone();
                if line.job_id.as_ref() == Some(job_id) && line.message != last_message {
                    println!("{}", line.message.dimmed());
                    last_message = line.message;
                }
            }
        }
    };

    // Terminal notifications carry the download link and failure reason
    loop {
        match events.try_recv() {
            Ok(event) if event.job_id().is_none_or(|id| id == job_id) => print_event(&event),
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }

    match phase {
        Some(JobPhase::Failed) => anyhow::bail!("Job {} failed", job_id),
        Some(JobPhase::Cancelled) => {
            println!(
                "{}",
                "Stopped following. The job keeps running on the service.".yellow()
            );
            Ok(())
        }
        Some(_) => Ok(()),
        None => anyhow::bail!("Job {} is not being followed", job_id),
    }
}

fn print_event(event: &LifecycleEvent) {
    match event {
        LifecycleEvent::Completed { job, download_url } => {
            println!("{} Your video is ready!", "✓".green());
            println!("  Job:      {}", job.id.to_string().cyan());
            println!("  Download: {}", download_url.cyan());
        }
        LifecycleEvent::Failed { job_id, reason } => {
            println!("{} Job {} failed: {}", "✗".red(), job_id, reason);
        }
        LifecycleEvent::RefreshFailed { reason } => {
            println!("{}", format!("Could not refresh history: {}", reason).yellow());
        }
        _ => {}
    }
}

/// Print a one-entry summary of a job
fn print_job_summary(controller: &JobController, job: &Job) {
    println!("  {} {}", "▸".cyan(), job.label());
    println!("    ID:      {}", job.id.to_string().dimmed());
    println!("    Status:  {}", colorize_status(job.status()));
    println!(
        "    Created: {}",
        job.created_at.format("%Y-%m-%d").to_string().dimmed()
    );
    if let Some(url) = controller.download_url(job) {
        println!("    Download: {}", url);
    }
    println!();
}

/// Print detailed job information
fn print_job_details(controller: &JobController, job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:       {}", job.id.to_string().cyan());
    println!("  Name:     {}", job.label());
    println!("  Status:   {}", colorize_status(job.status()));
    println!(
        "  Created:  {}",
        job.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    if let Some(locator) = job.result_locator() {
        println!("  Result:   {}", locator);
    }
    if let Some(url) = controller.download_url(job) {
        println!("  Download: {}", url.cyan());
    }
}

/// Colorize job status for display
fn colorize_status(status: JobStatus) -> ColoredString {
    match status {
        JobStatus::Completed => "Ready".green(),
        JobStatus::Failed => "Error".red(),
        JobStatus::Pending | JobStatus::Processing => "Processing...".yellow(),
    }
}

