//! Encoder command construction
//!
//! Builds the ffmpeg argument vector that turns one image sequence into a
//! video. The vector is handed to an [`EncoderPort`](crate::ports::EncoderPort)
//! as-is; nothing is ever joined into a shell string.

use crate::config::Settings;
use crate::output::SequenceDescriptor;

/// Video filter trimming odd dimensions, which libx264 with yuv420p rejects
pub const EVEN_DIMENSIONS_FILTER: &str = "crop=trunc(iw/2)*2:trunc(ih/2)*2";

/// Arguments for one sequence-to-video encode
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeCommand {
    input_pattern: String,
    output_path: String,
    framerate: f64,
    start_number: i64,
    hide_banner: bool,
    video_codec: String,
    pixel_format: String,
}

impl EncodeCommand {
    /// Encode `input_pattern` (a `%d` sequence pattern) into `output_path`
    pub fn new(input_pattern: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            input_pattern: input_pattern.into(),
            output_path: output_path.into(),
            framerate: 24.0,
            start_number: 0,
            hide_banner: true,
            video_codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
        }
    }

    /// Command for a sequence whose frame range has been reconciled
    pub fn for_sequence(seq: &SequenceDescriptor, settings: &Settings) -> Self {
        Self::new(seq.encoder_input_pattern(), seq.video_path())
            .framerate(settings.fps())
            .start_number(seq.frame_range().start)
            .hide_banner(settings.profile().suppress_banner)
    }

    pub fn framerate(mut self, fps: f64) -> Self {
        self.framerate = fps;
        self
    }

    /// First frame number of the input sequence
    pub fn start_number(mut self, frame: i64) -> Self {
        self.start_number = frame;
        self
    }

    pub fn hide_banner(mut self, hide: bool) -> Self {
        self.hide_banner = hide;
        self
    }

    pub fn input_pattern(&self) -> &str {
        &self.input_pattern
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    /// Argument vector, output path last
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["-nostdin".into()];
        if self.hide_banner {
            args.push("-hide_banner".into());
        }
        args.extend([
            "-loglevel".into(),
            "error".into(),
            "-framerate".into(),
            self.framerate.to_string(),
            "-start_number".into(),
            self.start_number.to_string(),
            "-pattern_type".into(),
            "sequence".into(),
            "-i".into(),
            self.input_pattern.clone(),
            "-vf".into(),
            EVEN_DIMENSIONS_FILTER.into(),
            "-pix_fmt".into(),
            self.pixel_format.clone(),
            "-c:v".into(),
            self.video_codec.clone(),
            "-movflags".into(),
            "+faststart".into(),
            self.output_path.clone(),
        ]);
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_order() {
        let command = EncodeCommand::new("/flip/a_000/a_000_0.%d.jpg", "/flip/a_000/a_000_0.mp4")
            .framerate(25.0)
            .start_number(1001);

        assert_eq!(
            command.args(),
            vec![
                "-nostdin",
                "-hide_banner",
                "-loglevel",
                "error",
                "-framerate",
                "25",
                "-start_number",
                "1001",
                "-pattern_type",
                "sequence",
                "-i",
                "/flip/a_000/a_000_0.%d.jpg",
                "-vf",
                "crop=trunc(iw/2)*2:trunc(ih/2)*2",
                "-pix_fmt",
                "yuv420p",
                "-c:v",
                "libx264",
                "-movflags",
                "+faststart",
                "/flip/a_000/a_000_0.mp4",
            ]
        );
    }

    #[test]
    fn test_banner_flag_is_optional() {
        let args = EncodeCommand::new("in.%d.jpg", "out.mp4")
            .hide_banner(false)
            .args();
        assert!(!args.contains(&"-hide_banner".to_string()));
        assert_eq!(args.first().map(String::as_str), Some("-nostdin"));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn test_fractional_rates_are_kept() {
        let args = EncodeCommand::new("in.%d.jpg", "out.mp4")
            .framerate(23.976)
            .start_number(-5)
            .args();
        assert!(args.windows(2).any(|w| w[0] == "-framerate" && w[1] == "23.976"));
        assert!(args.windows(2).any(|w| w[0] == "-start_number" && w[1] == "-5"));
    }
}
