//! Versioned output directory allocation

use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, trace};
use walkdir::WalkDir;

use crate::config::Settings;
use crate::domain::rules::zero_pad;
use crate::error::MplayBatchResult;
use crate::utils::path::PathUtils;

/// Directory `<root>/<base_name>_<sub_version>` receiving one batch
#[derive(Debug, Clone)]
pub struct OutputLocation {
    settings: Arc<Settings>,
    base_name: String,
    sub_version: String,
    directory: String,
}

impl OutputLocation {
    /// Pick the next free sub-version for `base_name` and create its directory.
    ///
    /// The sub-version is one more than the largest numeric suffix among the
    /// sibling directories, or zero when there are none. Listing and creating
    /// are separate steps, so two concurrent runs can pick the same number.
    pub fn allocate(base_name: &str, settings: Arc<Settings>) -> MplayBatchResult<Self> {
        let root = settings.flipbook_dir();
        let next = Self::next_sub_version(base_name, root)?;
        let sub_version = zero_pad(next, settings.pad_sub_version());

        let root_text = settings.profile().normalize_path(&root.to_string_lossy());
        let directory = PathUtils::join_forward(
            &root_text,
            &format!("{}_{}", base_name, sub_version),
        );

        std::fs::create_dir_all(&directory)?;
        info!("Writing flipbooks to {}", directory);

        Ok(Self {
            settings,
            base_name: base_name.to_string(),
            sub_version,
            directory,
        })
    }

    fn next_sub_version(base_name: &str, root: &Path) -> MplayBatchResult<u64> {
        let pattern = Regex::new(&format!(r"^{}_(\d+)$", regex::escape(base_name)))?;

        let mut highest: Option<u64> = None;
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    trace!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            let Some(caps) = pattern.captures(&name) else {
                continue;
            };
            match caps[1].parse::<u64>() {
                Ok(value) => highest = Some(highest.map_or(value, |h| h.max(value))),
                Err(_) => debug!("Ignoring oversized sub-version in {}", name),
            }
        }

        Ok(highest.map_or(0, |h| h.saturating_add(1)))
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Zero-padded sub-version
    pub fn sub_version(&self) -> &str {
        &self.sub_version
    }

    /// Forward-slash directory path
    pub fn directory(&self) -> &str {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Defaults, StaticOverrides};
    use crate::ports::SettingKey;
    use crate::test_support::{FakeEncoder, FakeHost};
    use crate::utils::PlatformProfile;

    fn settings(root: &Path, pad: &str) -> Arc<Settings> {
        let layer = StaticOverrides::new("test")
            .with(SettingKey::FlipbookDir, root.to_string_lossy())
            .with(SettingKey::PadSubVersion, pad);
        let settings = Settings::resolve(
            &[&layer],
            &Defaults::default(),
            &FakeHost::new("shot01.hip"),
            &FakeEncoder::installed(),
            PlatformProfile::linux(),
        )
        .unwrap();
        Arc::new(settings)
    }

    #[test]
    fn test_first_allocation_is_zero_then_one() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path(), "3");

        let first = OutputLocation::allocate("shot01", Arc::clone(&settings)).unwrap();
        assert_eq!(first.sub_version(), "000");
        assert!(dir.path().join("shot01_000").is_dir());

        let second = OutputLocation::allocate("shot01", settings).unwrap();
        assert_eq!(second.sub_version(), "001");
        assert!(second.directory().ends_with("/shot01_001"));
    }

    #[test]
    fn test_allocation_uses_numeric_maximum() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["shot01_0", "shot01_3", "shot01_7", "shot02_50", "shot01_x"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("shot01_99"), b"a file").unwrap();

        let location = OutputLocation::allocate("shot01", settings(dir.path(), "0")).unwrap();
        assert_eq!(location.sub_version(), "8");
    }

    #[test]
    fn test_padding_is_never_truncated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("shot01_000")).unwrap();
        std::fs::create_dir(dir.path().join("shot01_001")).unwrap();
        std::fs::create_dir(dir.path().join("shot01_1234")).unwrap();

        let location = OutputLocation::allocate("shot01", settings(dir.path(), "3")).unwrap();
        assert_eq!(location.sub_version(), "1235");
    }

    #[test]
    fn test_padded_siblings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("shot01_000")).unwrap();
        std::fs::create_dir(dir.path().join("shot01_001")).unwrap();

        let location = OutputLocation::allocate("shot01", settings(dir.path(), "3")).unwrap();
        assert_eq!(location.sub_version(), "002");
        assert_eq!(location.base_name(), "shot01");
    }

    #[test]
    fn test_oversized_suffix_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("shot01_2")).unwrap();
        std::fs::create_dir(dir.path().join("shot01_99999999999999999999999")).unwrap();

        let location = OutputLocation::allocate("shot01", settings(dir.path(), "0")).unwrap();
        assert_eq!(location.sub_version(), "3");
    }

    #[test]
    fn test_base_name_with_regex_characters() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("shot.v2_4")).unwrap();
        std::fs::create_dir(dir.path().join("shotXv2_9")).unwrap();

        let location = OutputLocation::allocate("shot.v2", settings(dir.path(), "0")).unwrap();
        assert_eq!(location.sub_version(), "5");
    }
}
