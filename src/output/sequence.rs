//! Image sequence naming and on-disk frame discovery

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, warn};

use crate::domain::model::FrameRange;
use crate::domain::rules::{natural_cmp, zero_pad};
use crate::error::{MplayBatchError, MplayBatchResult};
use crate::output::OutputLocation;
use crate::utils::path::PathUtils;

/// Frame token understood by the host's `imgsave`, escaped for script parsing
pub const HOST_FRAME_TOKEN: &str = r"\$\F";

const GLOB_FRAME_TOKEN: &str = "[0-9]*";
const ENCODER_FRAME_TOKEN: &str = "%d";

/// One image sequence inside an [`OutputLocation`]
///
/// Files are named `<base>_<sub_version>_<index>.<frame>.<ext>`.
#[derive(Debug, Clone)]
pub struct SequenceDescriptor {
    location: Arc<OutputLocation>,
    index: String,
    frame_range: FrameRange,
}

impl SequenceDescriptor {
    /// Describe sequence `index` of `location`.
    ///
    /// `hint` seeds the frame range until the files on disk are reconciled.
    pub fn describe(location: Arc<OutputLocation>, index: usize, hint: FrameRange) -> Self {
        let pad = location.settings().pad_seq_index();
        Self {
            location,
            index: zero_pad(index as u64, pad),
            frame_range: hint,
        }
    }

    pub fn location(&self) -> &Arc<OutputLocation> {
        &self.location
    }

    /// Zero-padded sequence index
    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn frame_range(&self) -> FrameRange {
        self.frame_range
    }

    /// Shared prefix of every file name, e.g. `shot01_000_0`
    pub fn stem(&self) -> String {
        format!(
            "{}_{}_{}",
            self.location.base_name(),
            self.location.sub_version(),
            self.index
        )
    }

    fn extension(&self) -> &str {
        self.location.settings().image_extension()
    }

    /// File name with the host frame token, as passed to `imgsave`
    pub fn basename(&self) -> String {
        format!("{}.{}.{}", self.stem(), HOST_FRAME_TOKEN, self.extension())
    }

    /// Full host-side path of the sequence
    pub fn file_path(&self) -> String {
        PathUtils::join_forward(self.location.directory(), &self.basename())
    }

    /// Glob matching every frame file of this sequence
    pub fn glob_pattern(&self) -> String {
        let name = format!(
            "{}.{}.{}",
            PathUtils::escape_glob(&self.stem()),
            GLOB_FRAME_TOKEN,
            PathUtils::escape_glob(self.extension())
        );
        PathUtils::join_forward(&PathUtils::escape_glob(self.location.directory()), &name)
    }

    /// Input pattern for the encoder's `sequence` pattern type
    pub fn encoder_input_pattern(&self) -> String {
        let name = format!(
            "{}.{}.{}",
            PathUtils::escape_sequence_pattern(&self.stem()),
            ENCODER_FRAME_TOKEN,
            PathUtils::escape_sequence_pattern(self.extension())
        );
        PathUtils::join_forward(
            &PathUtils::escape_sequence_pattern(self.location.directory()),
            &name,
        )
    }

    /// Video file written next to the frames
    pub fn video_path(&self) -> String {
        PathUtils::join_forward(
            self.location.directory(),
            &format!("{}.{}", self.stem(), self.location.settings().video_format()),
        )
    }

    /// Frame files on disk, in natural order
    pub fn files(&self) -> MplayBatchResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in glob::glob(&self.glob_pattern())? {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable sequence file: {}", e),
            }
        }
        files.sort_by(|a, b| compare_paths(a, b));
        Ok(files)
    }

    /// Read the frame range from the first and last files on disk.
    ///
    /// Returns `None` and leaves the range untouched when fewer than two
    /// files exist.
    pub fn reconcile_frame_range_from_disk(&mut self) -> MplayBatchResult<Option<FrameRange>> {
        let files = self.files()?;
        if files.len() < 2 {
            debug!(
                "{} file(s) on disk for {}, keeping frame range {}",
                files.len(),
                self.stem(),
                self.frame_range
            );
            return Ok(None);
        }

        let pattern = Regex::new(&format!(
            r"^{}\.(\d+)\.{}$",
            regex::escape(&self.stem()),
            regex::escape(self.extension())
        ))?;

        let start = frame_number(&pattern, &files[0])?;
        let end = frame_number(&pattern, &files[files.len() - 1])?;
        self.frame_range = FrameRange::new(start, end);
        debug!("Frame range on disk for {}: {}", self.stem(), self.frame_range);
        Ok(Some(self.frame_range))
    }
}

fn compare_paths(a: &Path, b: &Path) -> Ordering {
    natural_cmp(&a.to_string_lossy(), &b.to_string_lossy())
}

fn frame_number(pattern: &Regex, file: &Path) -> MplayBatchResult<i64> {
    let name = PathUtils::file_name(file);
    let caps = pattern
        .captures(&name)
        .ok_or_else(|| MplayBatchError::FrameNumberNotFound {
            file: file.display().to_string(),
        })?;
    caps[1]
        .parse::<i64>()
        .map_err(|_| MplayBatchError::InvalidFrameNumber {
            file: file.display().to_string(),
            token: caps[1].to_string(),
        })
}
