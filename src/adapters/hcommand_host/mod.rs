//! Host adapter over Houdini's `hcommand` port client
//!
//! MPlay opens a command port with `openport <port>`; `hcommand <port> <cmd>`
//! then runs an HScript command inside that session and prints its output.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use crate::domain::model::{FrameRange, ViewerHandle};
use crate::error::{MplayBatchError, MplayBatchResult};
use crate::ports::{HostPort, ScriptOutput};
use crate::utils::path::PathUtils;

/// Default name of the port client executable
pub const HCOMMAND_BINARY: &str = "hcommand";

/// Host adapter talking to a running MPlay session
#[derive(Debug, Clone)]
pub struct HcommandHost {
    program: String,
    port: u16,
}

impl HcommandHost {
    /// Create a host adapter for the session listening on `port`
    pub fn new(port: u16) -> Self {
        Self::with_program(HCOMMAND_BINARY, port)
    }

    /// Use a specific `hcommand` executable
    pub fn with_program(program: impl Into<String>, port: u16) -> Self {
        Self {
            program: program.into(),
            port,
        }
    }

    /// Run a query whose failure makes the session unusable
    fn checked(&self, command: &str) -> MplayBatchResult<ScriptOutput> {
        let result = self.run_script_command(command)?;
        if result.failed() {
            return Err(MplayBatchError::HostError {
                message: format!("{}: {}", command, result.error.trim()),
            });
        }
        Ok(result)
    }

    fn query(&self, command: &str) -> MplayBatchResult<String> {
        Ok(self.checked(command)?.output)
    }
}

/// Find the first number in a host report such as `Frames per second: 24`
fn parse_rate(report: &str) -> Option<f64> {
    report
        .split(|c: char| c.is_whitespace() || c == ':')
        .find_map(|token| token.parse::<f64>().ok())
        .filter(|rate| *rate > 0.0)
}

impl HostPort for HcommandHost {
    fn current_frame_rate(&self) -> MplayBatchResult<f64> {
        let report = self.query("fps")?;
        parse_rate(&report).ok_or_else(|| MplayBatchError::HostError {
            message: format!("Unexpected fps report: {}", report.trim()),
        })
    }

    fn current_document_base_name(&self) -> MplayBatchResult<String> {
        let hip_file = self.query("echo $HIPFILE")?;
        Ok(PathUtils::file_name(Path::new(hip_file.trim())))
    }

    fn current_session_frame_range_hint(&self) -> MplayBatchResult<FrameRange> {
        FrameRange::parse_report(&self.query("frange")?)
    }

    fn expand_placeholders(&self, text: &str) -> MplayBatchResult<String> {
        if !text.contains('$') {
            return Ok(text.to_string());
        }
        Ok(self.query(&format!("echo {}", text))?.trim().to_string())
    }

    fn run_script_command(&self, command: &str) -> MplayBatchResult<ScriptOutput> {
        debug!("hcommand {} {}", self.port, command);
        let output = Command::new(&self.program)
            .arg(self.port.to_string())
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MplayBatchError::HostError {
                message: format!("Failed to run {}: {}", self.program, e),
            })?;

        let mut result = ScriptOutput::new(
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        if !output.status.success() && !result.failed() {
            result.error = format!("{} exited with {}", self.program, output.status);
        }
        trace!("Host replied: {:?}", result);
        Ok(result)
    }

    fn list_open_sequence_names(&self) -> MplayBatchResult<Vec<String>> {
        Ok(self.checked("seqls")?.lines())
    }

    fn list_open_viewers(&self) -> MplayBatchResult<Vec<ViewerHandle>> {
        Ok(self
            .checked("imgviewls")?
            .lines()
            .into_iter()
            .map(ViewerHandle)
            .collect())
    }
}
