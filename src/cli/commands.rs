//! Command implementations

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::FFmpegAdapter;
use crate::app::{AppContainer, BatchReport, DefaultAppContainer, JobStatus};
use crate::app::container::ContainerOptions;
use crate::cli::args::{ConfigArgs, HostArgs, RunArgs};
use crate::cli::Cli;
use crate::domain::model::ToolSelection;
use crate::ports::EncoderPort;
use crate::utils::PlatformProfile;

fn container(cli: &Cli, host: &HostArgs) -> Result<DefaultAppContainer> {
    let options = ContainerOptions {
        port: host.port,
        hcommand: host.hcommand.clone(),
        config_file: cli.config.clone(),
        overrides: cli.overrides(),
    };
    DefaultAppContainer::new(options).context("Failed to set up MPlay Batch")
}

/// Execute the run command
pub fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let tool = ToolSelection::parse(&args.tool)?;
    info!("Running tool: {}", tool);

    let container = container(cli, &args.host)?;
    let settings = container
        .resolve_settings()
        .context("Invalid MPlay Batch settings")?;

    if !tool.writes_sequences() {
        println!("{}", settings.flipbook_dir().display());
        return Ok(());
    }

    let wants_video = args.video || settings.output_video();
    let keep_source = args.keep_source || settings.keep_video_source();
    let report = container
        .batch_writer(settings, wants_video, keep_source)?
        .enqueue(tool)?
        .execute()?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize batch report")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Execute the formats command
pub fn formats() -> Result<()> {
    let encoder = FFmpegAdapter::new(PlatformProfile::detect());
    let formats = encoder
        .list_formats()
        .context("Failed to query ffmpeg for its formats")?;
    for format in formats {
        println!("{}", format);
    }
    Ok(())
}

/// Execute the config command
pub fn config(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    let container = container(cli, &args.host)?;
    let settings = container
        .resolve_settings()
        .context("Invalid MPlay Batch settings")?;

    if args.json {
        let json = serde_json::to_string_pretty(settings.as_ref())
            .context("Failed to serialize settings")?;
        println!("{}", json);
    } else {
        println!("{}", settings);
    }
    Ok(())
}

fn print_report(report: &BatchReport) {
    println!("Output directory: {}", report.directory);
    for job in &report.jobs {
        match job.status {
            JobStatus::Written => println!("  written   frames {}", job.frame_range),
            JobStatus::Encoded => println!(
                "  encoded   frames {} -> {}",
                job.frame_range,
                job.video_path.as_deref().unwrap_or_default()
            ),
            JobStatus::WriteFailed => println!("  failed    {}", job.command),
        }
    }
    println!("{} of {} sequence(s) saved", report.succeeded(), report.jobs.len());
}
