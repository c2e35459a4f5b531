// Domain models - Core types and data structures

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::MplayBatchError;

/// Inclusive frame range of an image sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
}

impl FrameRange {
    /// Create a new frame range
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Number of frames covered, counting both ends
    pub fn frame_count(&self) -> u64 {
        self.end.abs_diff(self.start) + 1
    }

    /// Parse the host's `frange` report, e.g. `Frame range: 1 to 240`
    ///
    /// Fractional frames are truncated toward zero.
    pub fn parse_report(report: &str) -> Result<Self, MplayBatchError> {
        let bad_report = || MplayBatchError::HostError {
            message: format!("Unexpected frame range report: {}", report.trim()),
        };

        let range = report
            .split("Frame range:")
            .nth(1)
            .ok_or_else(bad_report)?;
        let mut bounds = range.split(" to ");
        let mut next_frame = || -> Result<i64, MplayBatchError> {
            let token = bounds.next().ok_or_else(bad_report)?.trim();
            let value = token.parse::<f64>().map_err(|_| bad_report())?;
            Ok(value.trunc() as i64)
        };

        let start = next_frame()?;
        let end = next_frame()?;
        Ok(Self::new(start, end))
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Menu tool selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSelection {
    /// Reveal the flipbook output root
    OpenFlipbookDir,
    /// Save the sequence currently shown in the viewer
    SaveCurrent,
    /// Save every sequence in the sequence list
    SaveAllSequences,
    /// Save every open image viewer
    SaveAllViewers,
}

impl ToolSelection {
    /// Canonical menu token for this tool
    pub fn token(&self) -> &'static str {
        match self {
            ToolSelection::OpenFlipbookDir => "open_flipbook_dir",
            ToolSelection::SaveCurrent => "save_current",
            ToolSelection::SaveAllSequences => "save_all_seqs",
            ToolSelection::SaveAllViewers => "save_all_viewers",
        }
    }

    /// Whether this tool writes image sequences
    pub fn writes_sequences(&self) -> bool {
        !matches!(self, ToolSelection::OpenFlipbookDir)
    }

    /// Parse a menu token; dashes and underscores are interchangeable
    pub fn parse(token: &str) -> Result<Self, MplayBatchError> {
        let normalized = token.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "open_flipbook_dir" | "open_output_dir" => Ok(ToolSelection::OpenFlipbookDir),
            "save_current" => Ok(ToolSelection::SaveCurrent),
            "save_all_seqs" | "save_all_sequences" => Ok(ToolSelection::SaveAllSequences),
            "save_all_viewers" => Ok(ToolSelection::SaveAllViewers),
            _ => Err(MplayBatchError::UnknownTool {
                token: token.to_string(),
            }),
        }
    }
}

impl FromStr for ToolSelection {
    type Err = MplayBatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ToolSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Handle to an open image viewer, as listed by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewerHandle(pub String);

impl ViewerHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
