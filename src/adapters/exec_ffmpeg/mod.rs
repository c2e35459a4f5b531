//! FFmpeg execution adapter
//!
//! Runs the ffmpeg command-line tool as a child process. Arguments are always
//! passed as a vector, never through a shell.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::domain::rules::parse_muxer_list;
use crate::error::{MplayBatchError, MplayBatchResult};
use crate::ports::{EncoderExit, EncoderPort};
use crate::utils::PlatformProfile;

/// Name of the encoder executable on the search path
pub const FFMPEG_BINARY: &str = "ffmpeg";

/// FFmpeg-based execution adapter
#[derive(Debug, Clone)]
pub struct FFmpegAdapter {
    binary: String,
    profile: PlatformProfile,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(profile: PlatformProfile) -> Self {
        Self::with_binary(FFMPEG_BINARY, profile)
    }

    /// Use a different executable name or path
    pub fn with_binary(binary: impl Into<String>, profile: PlatformProfile) -> Self {
        Self {
            binary: binary.into(),
            profile,
        }
    }

    fn command(&self, program: &Path) -> Command {
        let mut command = Command::new(program);
        command.stdin(Stdio::null());
        hide_console(&mut command, self.profile.hide_console);
        command
    }

    fn require_binary(&self) -> MplayBatchResult<PathBuf> {
        self.locate().ok_or(MplayBatchError::MissingEncoder)
    }
}

#[cfg(windows)]
fn hide_console(command: &mut Command, hide: bool) {
    use std::os::windows::process::CommandExt;
    if hide {
        command.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);
    }
}

#[cfg(not(windows))]
fn hide_console(_command: &mut Command, _hide: bool) {}

/// Quote an argument vector for log and error messages
pub fn format_command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(|arg| {
            if arg.is_empty() || arg.contains(char::is_whitespace) || arg.contains('"') {
                format!("\"{}\"", arg.replace('"', "\\\""))
            } else {
                arg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl EncoderPort for FFmpegAdapter {
    fn locate(&self) -> Option<PathBuf> {
        match which::which(&self.binary) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("{} not found on PATH: {}", self.binary, e);
                None
            }
        }
    }

    fn list_formats(&self) -> MplayBatchResult<Vec<String>> {
        let program = self.require_binary()?;
        let mut args = vec!["-loglevel".to_string(), "error".to_string(), "-muxers".to_string()];
        if self.profile.suppress_banner {
            args.insert(0, "-hide_banner".to_string());
        }

        let output = self.command(&program).args(&args).output()?;
        if !output.status.success() {
            return Err(MplayBatchError::EncoderQueryFailed {
                command: format_command_line(&program.to_string_lossy(), &args),
                exit_code: output.status.code(),
            });
        }

        let formats = parse_muxer_list(&String::from_utf8_lossy(&output.stdout));
        debug!("Encoder reports {} muxers", formats.len());
        Ok(formats)
    }

    fn run(&self, args: &[String]) -> MplayBatchResult<EncoderExit> {
        let program = self.require_binary()?;
        let command_line = format_command_line(&program.to_string_lossy(), args);
        info!("Running encoder: {}", command_line);

        let output = self
            .command(&program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        for line in String::from_utf8_lossy(&output.stderr).lines() {
            if !line.trim().is_empty() {
                warn!("ffmpeg: {}", line);
            }
        }

        Ok(EncoderExit {
            code: output.status.code(),
            command_line,
        })
    }
}
