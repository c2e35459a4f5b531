// Ports - Interface definitions (contracts)

use std::path::PathBuf;

use crate::domain::model::{FrameRange, ViewerHandle};
use crate::error::MplayBatchResult;

/// Text returned by one host script command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    /// Regular command output
    pub output: String,
    /// Error text reported by the host; empty on success
    pub error: String,
}

impl ScriptOutput {
    pub fn new(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: error.into(),
        }
    }

    /// Whether the host reported the command as failed
    pub fn failed(&self) -> bool {
        !self.error.trim().is_empty()
    }

    /// Non-empty output lines, trimmed
    pub fn lines(&self) -> Vec<String> {
        self.output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Port for the running host session (MPlay)
///
/// Every call blocks until the host answers.
pub trait HostPort: Send + Sync {
    /// Playback rate of the session
    fn current_frame_rate(&self) -> MplayBatchResult<f64>;

    /// File name of the open document, e.g. `shot01.hip`
    fn current_document_base_name(&self) -> MplayBatchResult<String>;

    /// Session frame range. A hint only: it spans every loaded sequence.
    fn current_session_frame_range_hint(&self) -> MplayBatchResult<FrameRange>;

    /// Expand `$VAR` tokens the way the host does
    fn expand_placeholders(&self, text: &str) -> MplayBatchResult<String>;

    /// Run one host script command
    fn run_script_command(&self, command: &str) -> MplayBatchResult<ScriptOutput>;

    /// Names from the sequence list, in list order
    fn list_open_sequence_names(&self) -> MplayBatchResult<Vec<String>>;

    /// Open image viewers, in host order
    fn list_open_viewers(&self) -> MplayBatchResult<Vec<ViewerHandle>>;
}

/// Exit report of one encoder run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderExit {
    /// Process exit code; `None` when killed by a signal
    pub code: Option<i32>,
    /// Full command line, for diagnostics
    pub command_line: String,
}

impl EncoderExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Port for the external video encoder
pub trait EncoderPort: Send + Sync {
    /// Path of the encoder executable, if it is on the search path
    fn locate(&self) -> Option<PathBuf>;

    /// Container formats the encoder can mux
    fn list_formats(&self) -> MplayBatchResult<Vec<String>>;

    /// Run the encoder with an explicit argument vector and wait for it
    fn run(&self, args: &[String]) -> MplayBatchResult<EncoderExit>;
}

/// Port for one layer of configuration overrides
pub trait OverrideSource {
    /// Short name of the layer, used in logs
    fn layer_name(&self) -> &str;

    /// Raw value for a setting key, if this layer defines it
    fn lookup(&self, key: SettingKey) -> Option<String>;
}

/// Settings that can be overridden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Extension,
    VideoFormat,
    FlipbookDir,
    PadSubVersion,
    PadSeqIndex,
    KeepVideoSource,
    OutputVideo,
}

impl SettingKey {
    pub const ALL: [SettingKey; 7] = [
        SettingKey::Extension,
        SettingKey::VideoFormat,
        SettingKey::FlipbookDir,
        SettingKey::PadSubVersion,
        SettingKey::PadSeqIndex,
        SettingKey::KeepVideoSource,
        SettingKey::OutputVideo,
    ];

    /// Environment variable carrying this setting
    pub fn env_var(&self) -> &'static str {
        match self {
            SettingKey::Extension => "MPLAY_BATCH_EXTENSION",
            SettingKey::VideoFormat => "MPLAY_BATCH_VIDEO_FORMAT",
            SettingKey::FlipbookDir => "MPLAY_BATCH_FLIPBOOK_DIR",
            SettingKey::PadSubVersion => "MPLAY_BATCH_PAD_SUB_VERSION",
            SettingKey::PadSeqIndex => "MPLAY_BATCH_PAD_SEQ_INDEX",
            SettingKey::KeepVideoSource => "MPLAY_BATCH_KEEP_VIDEO_SOURCE",
            SettingKey::OutputVideo => "MPLAY_BATCH_OUTPUT_VIDEO",
        }
    }

    /// Key inside the `[mplay_batch]` table of a config file
    pub fn file_key(&self) -> &'static str {
        match self {
            SettingKey::Extension => "extension",
            SettingKey::VideoFormat => "video_format",
            SettingKey::FlipbookDir => "flipbook_dir",
            SettingKey::PadSubVersion => "pad_sub_version",
            SettingKey::PadSeqIndex => "pad_seq_index",
            SettingKey::KeepVideoSource => "keep_video_source",
            SettingKey::OutputVideo => "output_video",
        }
    }
}
