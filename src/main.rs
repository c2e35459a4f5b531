//! MPlay Batch CLI
//!
//! Batch-saves MPlay flipbooks from a menu entry or a terminal.
//!
//! # Usage
//!
//! ```bash
//! mplay-batch run save_all_seqs --video --port 48626
//! mplay-batch formats
//! mplay-batch config --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use mplay_batch::adapters::tracing_log::{init_logging, parse_log_level, LogFormat};
use mplay_batch::cli::{commands, Cli, Commands};

/// Main entry point for the MPlay Batch CLI application
fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = parse_log_level(&cli.log_level)?;
    let format: LogFormat = cli.log_format.parse()?;
    init_logging(level, format);

    info!("Starting MPlay Batch");
    debug!("Arguments: {:?}", cli);

    match &cli.command {
        Commands::Run(args) => commands::run(&cli, args)?,
        Commands::Formats => commands::formats()?,
        Commands::Config(args) => commands::config(&cli, args)?,
    }

    info!("MPlay Batch completed successfully");
    Ok(())
}
