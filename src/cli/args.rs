//! Command-line argument definitions

use clap::Args;

/// Connection to the running MPlay session
#[derive(Args, Debug, Clone, Default)]
pub struct HostArgs {
    /// Command port opened in MPlay with `openport`
    #[arg(long, env = "MPLAY_BATCH_PORT")]
    pub port: Option<u16>,

    /// Path to the `hcommand` executable
    #[arg(long, env = "MPLAY_BATCH_HCOMMAND")]
    pub hcommand: Option<String>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Tool to run: open_flipbook_dir, save_current, save_all_seqs or save_all_viewers
    pub tool: String,

    /// Encode each saved sequence to video
    #[arg(long)]
    pub video: bool,

    /// Keep the image frames after encoding
    #[arg(long)]
    pub keep_source: bool,

    #[command(flatten)]
    pub host: HostArgs,

    /// Print the batch report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
