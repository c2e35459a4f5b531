//! Path utilities for sequence patterns

use std::path::{Path, PathBuf};

use crate::error::MplayBatchResult;

/// Path helpers shared by the output location and sequence descriptors
pub struct PathUtils;

impl PathUtils {
    /// Join with a literal `/` so escapes survive host script parsing
    pub fn join_forward(dir: &str, name: &str) -> String {
        format!("{}/{}", dir.trim_end_matches('/'), name)
    }

    /// Escape glob metacharacters in a literal path fragment
    pub fn escape_glob(fragment: &str) -> String {
        glob::Pattern::escape(fragment)
    }

    /// Escape `%` so the encoder does not read it as a sequence token
    pub fn escape_sequence_pattern(fragment: &str) -> String {
        fragment.replace('%', "%%")
    }

    /// Resolve a path against the current directory without touching the disk
    pub fn absolute(path: &Path) -> MplayBatchResult<PathBuf> {
        Ok(std::path::absolute(path)?)
    }

    /// File name component as text
    pub fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}
