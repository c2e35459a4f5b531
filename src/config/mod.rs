//! Session settings and their override hierarchy
//!
//! Each key is looked up in the override layers in order (the CLI builds them
//! as flags > environment > config file) and falls back to [`Defaults`].
//! Every value is validated while the [`Settings`] are resolved; a resolved
//! `Settings` is immutable and shared by `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::rules::{
    parse_padding, parse_toggle, rewrite_placeholder_tokens, sanitize_token,
};
use crate::error::{MplayBatchError, MplayBatchResult};
use crate::ports::{EncoderPort, HostPort, OverrideSource, SettingKey};
use crate::utils::path::PathUtils;
use crate::utils::PlatformProfile;

/// Built-in values used when no layer overrides a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub extension: String,
    pub video_format: String,
    pub flipbook_dir: String,
    pub pad_sub_version: usize,
    pub pad_seq_index: usize,
    pub keep_video_source: bool,
    pub output_video: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            extension: "jpg".to_string(),
            video_format: "mp4".to_string(),
            flipbook_dir: "$JOB/flip".to_string(),
            pad_sub_version: 3,
            pad_seq_index: 0,
            keep_video_source: false,
            output_video: false,
        }
    }
}

impl Defaults {
    fn raw(&self, key: SettingKey) -> String {
        match key {
            SettingKey::Extension => self.extension.clone(),
            SettingKey::VideoFormat => self.video_format.clone(),
            SettingKey::FlipbookDir => self.flipbook_dir.clone(),
            SettingKey::PadSubVersion => self.pad_sub_version.to_string(),
            SettingKey::PadSeqIndex => self.pad_seq_index.to_string(),
            SettingKey::KeepVideoSource => u8::from(self.keep_video_source).to_string(),
            SettingKey::OutputVideo => u8::from(self.output_video).to_string(),
        }
    }
}

/// Fixed set of overrides, used for command-line flags and in tests
#[derive(Debug, Clone, Default)]
pub struct StaticOverrides {
    name: String,
    values: HashMap<SettingKey, String>,
}

impl StaticOverrides {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: SettingKey, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: SettingKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl OverrideSource for StaticOverrides {
    fn layer_name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: SettingKey) -> Option<String> {
        self.values.get(&key).cloned()
    }
}

/// Validated settings for one run
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    image_extension: String,
    video_format: String,
    flipbook_dir: PathBuf,
    pad_sub_version: usize,
    pad_seq_index: usize,
    output_video: bool,
    keep_video_source: bool,
    fps: f64,
    #[serde(skip)]
    profile: PlatformProfile,
}

impl Settings {
    /// Resolve and validate every setting.
    ///
    /// May create the flipbook directory. Fails on the first invalid value.
    pub fn resolve(
        layers: &[&dyn OverrideSource],
        defaults: &Defaults,
        host: &dyn HostPort,
        encoder: &dyn EncoderPort,
        profile: PlatformProfile,
    ) -> MplayBatchResult<Self> {
        let value = |key: SettingKey| -> String {
            for layer in layers {
                if let Some(raw) = layer.lookup(key) {
                    debug!("{} = {:?} (from {})", key.env_var(), raw, layer.layer_name());
                    return raw;
                }
            }
            defaults.raw(key)
        };

        let image_extension = Self::validate_extension(&value(SettingKey::Extension))?;
        let video_format =
            Self::validate_video_format(&value(SettingKey::VideoFormat), encoder, &profile)?;
        let flipbook_dir = Self::validate_flipbook_dir(&value(SettingKey::FlipbookDir), host)?;
        let pad_sub_version = parse_padding(
            &value(SettingKey::PadSubVersion),
            SettingKey::PadSubVersion.env_var(),
        )?;
        let pad_seq_index = parse_padding(
            &value(SettingKey::PadSeqIndex),
            SettingKey::PadSeqIndex.env_var(),
        )?;
        let output_video = parse_toggle(Some(&value(SettingKey::OutputVideo)));
        let keep_video_source = parse_toggle(Some(&value(SettingKey::KeepVideoSource)));
        let fps = host.current_frame_rate()?;

        let settings = Self {
            image_extension,
            video_format,
            flipbook_dir,
            pad_sub_version,
            pad_seq_index,
            output_video,
            keep_video_source,
            fps,
            profile,
        };
        debug!("Resolved settings: {:?}", settings);
        Ok(settings)
    }

    fn validate_extension(raw: &str) -> MplayBatchResult<String> {
        let extension = sanitize_token(raw);
        if extension.is_empty() {
            return Err(MplayBatchError::InvalidVariableValue {
                var: SettingKey::Extension.env_var().to_string(),
                value: raw.to_string(),
            });
        }
        Ok(extension)
    }

    /// Check the container against the encoder's muxers.
    ///
    /// Without an encoder on the search path the value is accepted as-is and
    /// checked again when an encode is attempted.
    fn validate_video_format(
        raw: &str,
        encoder: &dyn EncoderPort,
        profile: &PlatformProfile,
    ) -> MplayBatchResult<String> {
        let format = sanitize_token(raw).to_lowercase();
        if format.is_empty() {
            return Err(MplayBatchError::InvalidVariableValue {
                var: SettingKey::VideoFormat.env_var().to_string(),
                value: raw.to_string(),
            });
        }

        if encoder.locate().is_none() {
            debug!("Encoder not found, accepting video format {} unchecked", format);
            return Ok(format);
        }

        let supported = match encoder.list_formats() {
            Ok(formats) if !formats.is_empty() => formats,
            Ok(_) => {
                warn!("Encoder reported no muxers, using the built-in format list");
                profile.fallback_video_formats.clone()
            }
            Err(e) => {
                warn!("Could not query encoder formats ({}), using the built-in format list", e);
                profile.fallback_video_formats.clone()
            }
        };

        if supported.iter().any(|f| *f == format) {
            Ok(format)
        } else {
            Err(MplayBatchError::UnsupportedVideoFormat { format, supported })
        }
    }

    fn validate_flipbook_dir(raw: &str, host: &dyn HostPort) -> MplayBatchResult<PathBuf> {
        let expanded = host.expand_placeholders(&rewrite_placeholder_tokens(raw))?;
        let expanded = expanded.trim();
        if expanded.is_empty() {
            return Err(MplayBatchError::InvalidVariableValue {
                var: SettingKey::FlipbookDir.env_var().to_string(),
                value: raw.to_string(),
            });
        }

        let dir = PathUtils::absolute(Path::new(expanded))?;
        if !dir.exists() {
            match std::fs::create_dir_all(&dir) {
                Ok(()) => info!("Created flipbook directory {}", dir.display()),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }
        if !dir.is_dir() {
            return Err(MplayBatchError::NotADirectory {
                path: dir.display().to_string(),
            });
        }
        Ok(dir)
    }

    /// Image file extension, without a dot
    pub fn image_extension(&self) -> &str {
        &self.image_extension
    }

    /// Video container written by the encoder
    pub fn video_format(&self) -> &str {
        &self.video_format
    }

    /// Root directory receiving the versioned sequence directories
    pub fn flipbook_dir(&self) -> &Path {
        &self.flipbook_dir
    }

    pub fn pad_sub_version(&self) -> usize {
        self.pad_sub_version
    }

    pub fn pad_seq_index(&self) -> usize {
        self.pad_seq_index
    }

    pub fn output_video(&self) -> bool {
        self.output_video
    }

    pub fn keep_video_source(&self) -> bool {
        self.keep_video_source
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image extension:   {}", self.image_extension)?;
        writeln!(f, "Video format:      {}", self.video_format)?;
        writeln!(f, "Flipbook dir:      {}", self.flipbook_dir.display())?;
        writeln!(f, "Sub-version pad:   {}", self.pad_sub_version)?;
        writeln!(f, "Sequence pad:      {}", self.pad_seq_index)?;
        writeln!(f, "Output video:      {}", self.output_video)?;
        writeln!(f, "Keep video source: {}", self.keep_video_source)?;
        write!(f, "Frames per second: {}", self.fps)
    }
}
