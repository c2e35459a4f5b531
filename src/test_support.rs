//! In-memory host and encoder doubles for unit tests

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use regex::Regex;

use crate::domain::model::{FrameRange, ViewerHandle};
use crate::error::{MplayBatchError, MplayBatchResult};
use crate::output::sequence::HOST_FRAME_TOKEN;
use crate::ports::{EncoderExit, EncoderPort, HostPort, ScriptOutput};

/// Host double that records script commands and writes fake frames
pub struct FakeHost {
    pub fps: f64,
    pub document: String,
    pub range: FrameRange,
    pub sequences: Vec<String>,
    pub viewers: Vec<String>,
    pub variables: HashMap<String, String>,
    /// Commands containing one of these fragments are reported as failed
    pub failing_writes: Vec<String>,
    /// Frames actually written by `imgsave`; `None` writes nothing
    pub written_frames: Option<FrameRange>,
    pub commands: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new(document: &str) -> Self {
        Self {
            fps: 24.0,
            document: document.to_string(),
            range: FrameRange::new(1, 10),
            sequences: Vec::new(),
            viewers: Vec::new(),
            variables: HashMap::new(),
            failing_writes: Vec::new(),
            written_frames: Some(FrameRange::new(1, 10)),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn with_variable(mut self, name: &str, value: &str) -> Self {
        self.variables.insert(name.to_string(), value.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    fn write_frames(&self, command: &str) {
        let Some(frames) = self.written_frames else {
            return;
        };
        let Some(pattern) = command.split_whitespace().skip_while(|t| *t != "-a").nth(1) else {
            return;
        };
        for frame in frames.start..=frames.end {
            let path = pattern.replace(HOST_FRAME_TOKEN, &frame.to_string());
            std::fs::write(path, b"frame").unwrap();
        }
    }
}

impl HostPort for FakeHost {
    fn current_frame_rate(&self) -> MplayBatchResult<f64> {
        Ok(self.fps)
    }

    fn current_document_base_name(&self) -> MplayBatchResult<String> {
        Ok(self.document.clone())
    }

    fn current_session_frame_range_hint(&self) -> MplayBatchResult<FrameRange> {
        Ok(self.range)
    }

    fn expand_placeholders(&self, text: &str) -> MplayBatchResult<String> {
        let re = Regex::new(r"\$(\w+)").unwrap();
        Ok(re
            .replace_all(text, |caps: &regex::Captures<'_>| {
                self.variables.get(&caps[1]).cloned().unwrap_or_default()
            })
            .into_owned())
    }

    fn run_script_command(&self, command: &str) -> MplayBatchResult<ScriptOutput> {
        self.commands.lock().unwrap().push(command.to_string());
        if self.failing_writes.iter().any(|f| command.contains(f.as_str())) {
            return Ok(ScriptOutput::new("", "Unable to save image"));
        }
        if command.starts_with("imgsave") {
            self.write_frames(command);
        }
        Ok(ScriptOutput::default())
    }

    fn list_open_sequence_names(&self) -> MplayBatchResult<Vec<String>> {
        Ok(self.sequences.clone())
    }

    fn list_open_viewers(&self) -> MplayBatchResult<Vec<ViewerHandle>> {
        Ok(self.viewers.iter().cloned().map(ViewerHandle).collect())
    }
}

/// Encoder double with a fixed muxer list and exit code
pub struct FakeEncoder {
    pub installed: bool,
    pub formats: Option<Vec<String>>,
    pub exit_code: i32,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl FakeEncoder {
    pub fn installed() -> Self {
        Self {
            installed: true,
            formats: Some(vec!["mp4".to_string(), "mov".to_string(), "avi".to_string()]),
            exit_code: 0,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn missing() -> Self {
        Self {
            installed: false,
            ..Self::installed()
        }
    }

    pub fn failing(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::installed()
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl EncoderPort for FakeEncoder {
    fn locate(&self) -> Option<PathBuf> {
        self.installed.then(|| PathBuf::from("/usr/bin/ffmpeg"))
    }

    fn list_formats(&self) -> MplayBatchResult<Vec<String>> {
        self.formats.clone().ok_or_else(|| MplayBatchError::HostError {
            message: "muxer query failed".to_string(),
        })
    }

    fn run(&self, args: &[String]) -> MplayBatchResult<EncoderExit> {
        if !self.installed {
            return Err(MplayBatchError::MissingEncoder);
        }
        self.calls.lock().unwrap().push(args.to_vec());
        if self.exit_code == 0 {
            if let Some(output) = args.last() {
                std::fs::write(output, b"video").unwrap();
            }
        }
        Ok(EncoderExit {
            code: Some(self.exit_code),
            command_line: format!("ffmpeg {}", args.join(" ")),
        })
    }
}
