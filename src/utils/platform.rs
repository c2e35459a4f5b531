//! Platform profile
//!
//! Every behavior that differs between operating systems lives here. The
//! profile is detected once per run and handed to whatever needs it.

/// Platform-dependent behavior for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    /// Native path separator to rewrite as `/`, if it is not already `/`
    pub native_separator: Option<char>,
    /// Pass `-hide_banner` to the encoder
    pub suppress_banner: bool,
    /// Launch child processes without a console window
    pub hide_console: bool,
    /// Formats assumed muxable when the encoder cannot be queried
    pub fallback_video_formats: Vec<String>,
}

impl PlatformProfile {
    /// Profile of the platform this binary was built for
    pub fn detect() -> Self {
        if cfg!(windows) {
            Self::windows()
        } else if cfg!(target_os = "linux") {
            Self::linux()
        } else {
            Self::macos()
        }
    }

    pub fn windows() -> Self {
        Self {
            native_separator: Some('\\'),
            suppress_banner: true,
            hide_console: true,
            fallback_video_formats: formats(&["mp4", "mov", "avi"]),
        }
    }

    /// Linux builds of ffmpeg shipped with older studio distros reject
    /// `-hide_banner`, so it is left out there.
    pub fn linux() -> Self {
        Self {
            native_separator: None,
            suppress_banner: false,
            hide_console: false,
            fallback_video_formats: formats(&["mp4", "mov"]),
        }
    }

    pub fn macos() -> Self {
        Self {
            native_separator: None,
            suppress_banner: true,
            hide_console: false,
            fallback_video_formats: formats(&["mp4", "mov"]),
        }
    }

    /// Rewrite native separators as forward slashes.
    ///
    /// Patterns built from these paths travel through both host script and
    /// encoder argument contexts, which disagree on backslash escapes.
    pub fn normalize_path(&self, path: &str) -> String {
        match self.native_separator {
            Some(sep) => path.replace(sep, "/"),
            None => path.to_string(),
        }
    }
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::detect()
    }
}

fn formats(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
