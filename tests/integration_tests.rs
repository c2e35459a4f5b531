use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mplay_batch::app::container::{AppContainer, DefaultAppContainer};
use mplay_batch::domain::rules::{natural_cmp, zero_pad};
use mplay_batch::*;
use tempfile::TempDir;

/// Session doubles speaking the public port traits
mod test_utils {
    use super::*;

    /// Host that records every script command and writes frames on `imgsave`
    pub struct RecordingHost {
        pub document: String,
        pub sequences: Vec<String>,
        pub frames: FrameRange,
        pub variables: HashMap<String, String>,
        pub commands: Mutex<Vec<String>>,
    }

    impl RecordingHost {
        pub fn new(document: &str) -> Self {
            Self {
                document: document.to_string(),
                sequences: Vec::new(),
                frames: FrameRange::new(1, 5),
                variables: HashMap::new(),
                commands: Mutex::new(Vec::new()),
            }
        }

        pub fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }
    }

    impl HostPort for RecordingHost {
        fn current_frame_rate(&self) -> MplayBatchResult<f64> {
            Ok(25.0)
        }

        fn current_document_base_name(&self) -> MplayBatchResult<String> {
            Ok(self.document.clone())
        }

        fn current_session_frame_range_hint(&self) -> MplayBatchResult<FrameRange> {
            Ok(FrameRange::new(1, 240))
        }

        fn expand_placeholders(&self, text: &str) -> MplayBatchResult<String> {
            let mut expanded = text.to_string();
            for (name, value) in &self.variables {
                expanded = expanded.replace(&format!("${}", name), value);
            }
            Ok(expanded)
        }

        fn run_script_command(&self, command: &str) -> MplayBatchResult<ScriptOutput> {
            self.commands.lock().unwrap().push(command.to_string());
            let pattern = command
                .split_whitespace()
                .skip_while(|token| *token != "-a")
                .nth(1);
            if let Some(pattern) = pattern {
                for frame in self.frames.start..=self.frames.end {
                    let path = pattern.replace(HOST_FRAME, &frame.to_string());
                    std::fs::write(path, b"frame").unwrap();
                }
            }
            Ok(ScriptOutput::default())
        }

        fn list_open_sequence_names(&self) -> MplayBatchResult<Vec<String>> {
            Ok(self.sequences.clone())
        }

        fn list_open_viewers(&self) -> MplayBatchResult<Vec<ViewerHandle>> {
            Ok(Vec::new())
        }
    }

    pub const HOST_FRAME: &str = mplay_batch::output::HOST_FRAME_TOKEN;

    /// Encoder with a scripted exit code
    pub struct ScriptedEncoder {
        pub path: Option<PathBuf>,
        pub exit_code: i32,
        pub runs: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedEncoder {
        pub fn new(exit_code: i32) -> Self {
            Self {
                path: Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")),
                exit_code,
                runs: Mutex::new(Vec::new()),
            }
        }

        pub fn absent() -> Self {
            Self {
                path: None,
                ..Self::new(0)
            }
        }
    }

    impl EncoderPort for ScriptedEncoder {
        fn locate(&self) -> Option<PathBuf> {
            self.path.clone()
        }

        fn list_formats(&self) -> MplayBatchResult<Vec<String>> {
            Ok(vec!["mp4".to_string(), "mov".to_string()])
        }

        fn run(&self, args: &[String]) -> MplayBatchResult<EncoderExit> {
            self.runs.lock().unwrap().push(args.to_vec());
            if self.exit_code == 0 {
                std::fs::write(args.last().unwrap(), b"video").unwrap();
            }
            Ok(EncoderExit {
                code: Some(self.exit_code),
                command_line: format!("ffmpeg {}", args.join(" ")),
            })
        }
    }

    pub fn container(
        root: &Path,
        host: Arc<RecordingHost>,
        encoder: Arc<ScriptedEncoder>,
        overrides: StaticOverrides,
    ) -> DefaultAppContainer {
        let overrides = overrides.with(SettingKey::FlipbookDir, root.to_string_lossy());
        DefaultAppContainer::with_ports(host, encoder, PlatformProfile::linux(), overrides, None)
    }

    pub fn images_in(dir: &str, ext: &str) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|e| e == ext))
            .count()
    }
}

use test_utils::*;

#[test]
fn test_padding_width() {
    for pad in 0..6 {
        let padded = zero_pad(7, pad);
        assert_eq!(padded.len(), pad.max(1));
    }
    assert_eq!(zero_pad(12345, 3), "12345");
}

#[test]
fn test_natural_sort_property() {
    let mut files = vec!["a_9.jpg", "a_10.jpg", "a_2.jpg"];
    files.sort_by(|a, b| natural_cmp(a, b));
    assert_eq!(files, vec!["a_2.jpg", "a_9.jpg", "a_10.jpg"]);
}

#[test]
fn test_extension_override_is_sanitized() {
    let root = TempDir::new().unwrap();
    let container = container(
        root.path(),
        Arc::new(RecordingHost::new("shot01.hip")),
        Arc::new(ScriptedEncoder::new(0)),
        StaticOverrides::new("test").with(SettingKey::Extension, ".EXR"),
    );

    let settings = container.resolve_settings().unwrap();
    assert_eq!(settings.image_extension(), "EXR");
}

#[test]
fn test_missing_encoder_issues_no_script_commands() {
    let root = TempDir::new().unwrap();
    let host = Arc::new(RecordingHost::new("shot01.hip"));
    let container = container(
        root.path(),
        host.clone(),
        Arc::new(ScriptedEncoder::absent()),
        StaticOverrides::new("test"),
    );

    let settings = container.resolve_settings().unwrap();
    let result = container.batch_writer(settings, true, false);

    assert!(matches!(result, Err(MplayBatchError::MissingEncoder)));
    assert!(host.commands().is_empty());
}

#[test]
fn test_failed_encode_leaves_sources_on_disk() {
    let root = TempDir::new().unwrap();
    let host = Arc::new(RecordingHost::new("shot01.hip"));
    let encoder = Arc::new(ScriptedEncoder::new(1));
    let container = container(root.path(), host, encoder.clone(), StaticOverrides::new("test"));

    let settings = container.resolve_settings().unwrap();
    let err = container
        .batch_writer(settings, true, false)
        .unwrap()
        .enqueue_current_selection()
        .unwrap()
        .execute()
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("Return Code: 1"), "{message}");
    assert!(message.contains("shot01_000_0.[0-9]*.jpg"), "{message}");
    let dir = root.path().join("shot01_000");
    assert_eq!(images_in(&dir.to_string_lossy(), "jpg"), 5);
}

#[test]
fn test_allocation_after_padded_siblings() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join("shot01_000")).unwrap();
    std::fs::create_dir(root.path().join("shot01_001")).unwrap();
    let container = container(
        root.path(),
        Arc::new(RecordingHost::new("shot01.hip")),
        Arc::new(ScriptedEncoder::new(0)),
        StaticOverrides::new("test").with(SettingKey::PadSubVersion, "3"),
    );

    let settings = container.resolve_settings().unwrap();
    let writer = container.batch_writer(settings, false, false).unwrap();
    assert!(writer.location().directory().ends_with("/shot01_002"));
    assert!(root.path().join("shot01_002").is_dir());
}

#[test]
fn test_allocation_is_never_reused() {
    let root = TempDir::new().unwrap();
    let container = container(
        root.path(),
        Arc::new(RecordingHost::new("shot01.hip")),
        Arc::new(ScriptedEncoder::new(0)),
        StaticOverrides::new("test").with(SettingKey::PadSubVersion, "0"),
    );
    let settings = container.resolve_settings().unwrap();

    let first = OutputLocation::allocate("shot01", Arc::clone(&settings)).unwrap();
    let second = OutputLocation::allocate("shot01", settings).unwrap();
    assert_eq!(first.sub_version(), "0");
    assert_eq!(second.sub_version(), "1");
    assert_ne!(first.directory(), second.directory());
}

#[test]
fn test_glob_round_trip_recovers_frame_numbers() {
    let root = TempDir::new().unwrap();
    let container = container(
        root.path(),
        Arc::new(RecordingHost::new("shot01.hip")),
        Arc::new(ScriptedEncoder::new(0)),
        StaticOverrides::new("test"),
    );
    let settings = container.resolve_settings().unwrap();
    let location = Arc::new(OutputLocation::allocate("shot01", settings).unwrap());
    let mut seq = SequenceDescriptor::describe(Arc::clone(&location), 0, FrameRange::new(1, 1));

    for frame in [1017, 1042] {
        let file = seq.file_path().replace(HOST_FRAME, &frame.to_string());
        std::fs::write(file, b"frame").unwrap();
    }
    assert_eq!(
        seq.reconcile_frame_range_from_disk().unwrap(),
        Some(FrameRange::new(1017, 1042))
    );
}

#[test]
fn test_save_all_sequences_with_video() {
    let root = TempDir::new().unwrap();
    let mut host = RecordingHost::new("shot01.hiplc");
    host.sequences = vec!["beauty".to_string(), "spec".to_string()];
    host.frames = FrameRange::new(1001, 1004);
    let host = Arc::new(host);
    let encoder = Arc::new(ScriptedEncoder::new(0));
    let container = container(root.path(), host.clone(), encoder.clone(), StaticOverrides::new("test"));

    let settings = container.resolve_settings().unwrap();
    let report = container
        .batch_writer(settings, true, false)
        .unwrap()
        .enqueue(ToolSelection::SaveAllSequences)
        .unwrap()
        .execute()
        .unwrap();

    assert_eq!(report.jobs.len(), 2);
    for (index, job) in report.jobs.iter().enumerate() {
        assert_eq!(job.status, JobStatus::Encoded);
        assert_eq!(job.frame_range, FrameRange::new(1001, 1004));
        assert_eq!(job.removed_frames, 4);
        let video = job.video_path.as_deref().unwrap();
        assert!(video.ends_with(&format!("shot01_000_{}.mp4", index)));
        assert!(Path::new(video).is_file());
    }
    assert_eq!(images_in(&report.directory, "jpg"), 0);
    assert_eq!(encoder.runs.lock().unwrap().len(), 2);
    assert!(host.commands()[0].starts_with("imgsave -s beauty -a "));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["jobs"][0]["status"], "encoded");
    assert_eq!(json["jobs"][1]["frame_range"]["start"], 1001);
}

#[test]
fn test_flipbook_dir_uses_host_variables() {
    let root = TempDir::new().unwrap();
    let mut host = RecordingHost::new("shot01.hip");
    host.variables
        .insert("JOB".to_string(), root.path().to_string_lossy().to_string());
    let host = Arc::new(host);
    let container = DefaultAppContainer::with_ports(
        host,
        Arc::new(ScriptedEncoder::new(0)),
        PlatformProfile::linux(),
        StaticOverrides::new("test").with(SettingKey::FlipbookDir, "__JOB__/flipbooks"),
        None,
    );

    let settings = container.resolve_settings().unwrap();
    assert_eq!(settings.flipbook_dir(), root.path().join("flipbooks"));
    assert!(root.path().join("flipbooks").is_dir());
}
