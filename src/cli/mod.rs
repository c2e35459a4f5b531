//! CLI module for MPlay Batch
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::StaticOverrides;
use crate::ports::SettingKey;

pub mod args;
pub mod commands;

/// MPlay Batch
///
/// Saves MPlay flipbooks into versioned directories and optionally encodes
/// them to video with ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "mplay-batch")]
#[command(about = "Batch-save MPlay flipbooks and encode them to video")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// TOML file with setting overrides
    #[arg(long, env = "MPLAY_BATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Log output format: pretty or json
    #[arg(long, default_value = "pretty", global = true)]
    pub log_format: String,

    /// Image file extension
    #[arg(long, global = true)]
    pub extension: Option<String>,

    /// Video container format
    #[arg(long, global = true)]
    pub video_format: Option<String>,

    /// Root directory for flipbooks; `__NAME__` tokens become host variables
    #[arg(long, global = true)]
    pub flipbook_dir: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Setting overrides given as flags
    pub fn overrides(&self) -> StaticOverrides {
        let mut overrides = StaticOverrides::new("command line");
        let flags = [
            (SettingKey::Extension, &self.extension),
            (SettingKey::VideoFormat, &self.video_format),
            (SettingKey::FlipbookDir, &self.flipbook_dir),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                overrides.insert(key, value.clone());
            }
        }
        overrides
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a menu tool against the running MPlay session
    Run(args::RunArgs),
    /// List the container formats ffmpeg can write
    Formats,
    /// Resolve and print the settings
    Config(args::ConfigArgs),
}
