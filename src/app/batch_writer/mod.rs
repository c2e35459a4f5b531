// Batch writer - Saves flipbook sequences and encodes them to video

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::domain::model::{FrameRange, ToolSelection};
use crate::domain::rules::document_base_name;
use crate::engine::EncodeCommand;
use crate::error::{MplayBatchError, MplayBatchResult};
use crate::output::{OutputLocation, SequenceDescriptor};
use crate::ports::{EncoderPort, HostPort};

/// Outcome of one queued job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Frames written, no video requested
    Written,
    /// Frames written and encoded to video
    Encoded,
    /// The host reported the write as failed
    WriteFailed,
}

/// Report for one job, in queue order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub command: String,
    pub status: JobStatus,
    pub frame_range: FrameRange,
    pub video_path: Option<String>,
    pub removed_frames: usize,
}

/// Report for a whole batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub directory: String,
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    /// Number of jobs that did not fail
    pub fn succeeded(&self) -> usize {
        self.jobs
            .iter()
            .filter(|job| job.status != JobStatus::WriteFailed)
            .count()
    }
}

struct WriteJob {
    seq: SequenceDescriptor,
    command: String,
}

/// Queues host write commands and runs them, in order, when executed
pub struct BatchWriter {
    settings: Arc<Settings>,
    host: Arc<dyn HostPort>,
    encoder: Arc<dyn EncoderPort>,
    wants_video: bool,
    keep_source: bool,
    location: Arc<OutputLocation>,
    queue: Vec<WriteJob>,
}

impl BatchWriter {
    /// Allocate the output directory for the current document.
    ///
    /// When video is requested the encoder is looked up first, so a missing
    /// encoder fails before anything is created or asked of the host.
    pub fn new(
        settings: Arc<Settings>,
        host: Arc<dyn HostPort>,
        encoder: Arc<dyn EncoderPort>,
        wants_video: bool,
        keep_source: bool,
    ) -> MplayBatchResult<Self> {
        if wants_video {
            Self::require_encoder(encoder.as_ref())?;
        }

        let document = host.current_document_base_name()?;
        let base_name = document_base_name(&document);
        let location = OutputLocation::allocate(&base_name, Arc::clone(&settings))?;

        Ok(Self {
            settings,
            host,
            encoder,
            wants_video,
            keep_source,
            location: Arc::new(location),
            queue: Vec::new(),
        })
    }

    fn require_encoder(encoder: &dyn EncoderPort) -> MplayBatchResult<()> {
        match encoder.locate() {
            Some(path) => {
                debug!("Using encoder at {}", path.display());
                Ok(())
            }
            None => Err(MplayBatchError::MissingEncoder),
        }
    }

    pub fn location(&self) -> &Arc<OutputLocation> {
        &self.location
    }

    /// Number of queued jobs
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queue the jobs for a menu tool
    pub fn enqueue(self, tool: ToolSelection) -> MplayBatchResult<Self> {
        match tool {
            ToolSelection::SaveCurrent => self.enqueue_current_selection(),
            ToolSelection::SaveAllSequences => self.enqueue_all_sequences(),
            ToolSelection::SaveAllViewers => self.enqueue_all_viewers(),
            ToolSelection::OpenFlipbookDir => Ok(self),
        }
    }

    /// Save whatever the viewer currently shows
    pub fn enqueue_current_selection(mut self) -> MplayBatchResult<Self> {
        let hint = self.host.current_session_frame_range_hint()?;
        let seq = self.describe(0, hint);
        let command = format!("imgsave -a {}", seq.file_path());
        self.push(seq, command);
        Ok(self)
    }

    /// Save every sequence in the sequence list, one job each
    pub fn enqueue_all_sequences(mut self) -> MplayBatchResult<Self> {
        let names = self.host.list_open_sequence_names()?;
        let hint = self.host.current_session_frame_range_hint()?;
        for (index, name) in names.iter().enumerate() {
            let seq = self.describe(index, hint);
            let command = format!("imgsave -s {} -a {}", name, seq.file_path());
            self.push(seq, command);
        }
        Ok(self)
    }

    /// Save every open image viewer, one job each
    pub fn enqueue_all_viewers(mut self) -> MplayBatchResult<Self> {
        let viewers = self.host.list_open_viewers()?;
        let hint = self.host.current_session_frame_range_hint()?;
        for (index, viewer) in viewers.iter().enumerate() {
            let seq = self.describe(index, hint);
            let command = format!("imgsave -a {} {}", seq.file_path(), viewer);
            self.push(seq, command);
        }
        Ok(self)
    }

    fn describe(&self, index: usize, hint: FrameRange) -> SequenceDescriptor {
        SequenceDescriptor::describe(Arc::clone(&self.location), index, hint)
    }

    fn push(&mut self, seq: SequenceDescriptor, command: String) {
        debug!("Queued: {}", command);
        self.queue.push(WriteJob { seq, command });
    }

    /// Run every queued job in order.
    ///
    /// A write the host rejects is recorded and skipped. A failed encode
    /// stops the batch and keeps that sequence's frames on disk.
    pub fn execute(self) -> MplayBatchResult<BatchReport> {
        if self.wants_video {
            Self::require_encoder(self.encoder.as_ref())?;
        }

        info!("Writing {} sequence(s) to {}", self.queue.len(), self.location.directory());
        let mut jobs = Vec::with_capacity(self.queue.len());
        for WriteJob { mut seq, command } in self.queue {
            let result = self.host.run_script_command(&command)?;
            if result.failed() {
                warn!("Host failed to write {}: {}", seq.stem(), result.error.trim());
                jobs.push(JobReport {
                    command,
                    status: JobStatus::WriteFailed,
                    frame_range: seq.frame_range(),
                    video_path: None,
                    removed_frames: 0,
                });
                continue;
            }

            if !self.wants_video {
                info!("Wrote {}", seq.file_path());
                jobs.push(JobReport {
                    command,
                    status: JobStatus::Written,
                    frame_range: seq.frame_range(),
                    video_path: None,
                    removed_frames: 0,
                });
                continue;
            }

            seq.reconcile_frame_range_from_disk()?;
            let encode = EncodeCommand::for_sequence(&seq, &self.settings);
            let exit = self.encoder.run(&encode.args())?;
            if !exit.success() {
                return Err(MplayBatchError::EncodeFailed {
                    pattern: seq.glob_pattern(),
                    command: exit.command_line,
                    exit_code: exit.code,
                });
            }
            info!("Encoded {}", encode.output_path());

            let removed_frames = if self.keep_source {
                0
            } else {
                remove_sequence(&seq)
            };

            jobs.push(JobReport {
                command,
                status: JobStatus::Encoded,
                frame_range: seq.frame_range(),
                video_path: Some(encode.output_path().to_string()),
                removed_frames,
            });
        }

        Ok(BatchReport {
            directory: self.location.directory().to_string(),
            jobs,
        })
    }
}

/// Delete the frames of an encoded sequence; failures are only logged
fn remove_sequence(seq: &SequenceDescriptor) -> usize {
    let files = match seq.files() {
        Ok(files) => files,
        Err(e) => {
            warn!("Could not list frames of {}: {}", seq.stem(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for file in files {
        match std::fs::remove_file(&file) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Could not remove {}: {}", file.display(), e),
        }
    }
    debug!("Removed {} frame(s) of {}", removed, seq.stem());
    removed
}
