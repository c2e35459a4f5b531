//! MPlay Batch Library
//!
//! Saves the sequences loaded in a running MPlay session into versioned
//! directories and optionally encodes each one to video with ffmpeg.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod ports;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use app::{BatchReport, BatchWriter, JobReport, JobStatus};
pub use config::{Defaults, Settings, StaticOverrides};
pub use domain::model::{FrameRange, ToolSelection, ViewerHandle};
pub use error::{MplayBatchError, MplayBatchResult};
pub use output::{OutputLocation, SequenceDescriptor};
pub use ports::{EncoderExit, EncoderPort, HostPort, OverrideSource, ScriptOutput, SettingKey};
pub use utils::PlatformProfile;
