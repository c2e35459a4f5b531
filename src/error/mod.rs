//! Error handling module for MPlay Batch

use thiserror::Error;

/// Main error type for MPlay Batch operations
#[derive(Error, Debug)]
pub enum MplayBatchError {
    /// A setting could not be coerced to the expected type
    #[error("{{{var}}} : Invalid type for env variable. Must be <{expected}>")]
    InvalidVariableType { var: String, expected: String },

    /// A numeric setting is outside its accepted range
    #[error("{{{var}}} : Value out of range")]
    VariableOutOfRange { var: String },

    /// A setting is empty or unusable after sanitizing
    #[error("{{{var}}} : Invalid value \"{value}\"")]
    InvalidVariableValue { var: String, value: String },

    /// Video container not known to the encoder
    #[error("\"{format}\" is not currently supported by MPlay Batch on this system. Supported formats include: {}", .supported.join(", "))]
    UnsupportedVideoFormat {
        format: String,
        supported: Vec<String>,
    },

    /// Output root exists but is not a directory
    #[error("{path} is not a directory")]
    NotADirectory { path: String },

    /// Video was requested but ffmpeg is not on the search path
    #[error("Missing ffmpeg executable. To export video, please make sure it is installed and available on the system's PATH")]
    MissingEncoder,

    /// A file matched the sequence glob but carries no frame number
    #[error("No frame number found in {file}")]
    FrameNumberNotFound { file: String },

    /// A frame token could not be read as a frame number
    #[error("Invalid frame number \"{token}\" in {file}")]
    InvalidFrameNumber { file: String, token: String },

    /// The encoder exited with a failure status
    #[error("Failed to write video for {pattern}. Command: {command}. Return Code: {}", .exit_code.map_or_else(|| "terminated by signal".to_string(), |code| code.to_string()))]
    EncodeFailed {
        pattern: String,
        command: String,
        exit_code: Option<i32>,
    },

    /// The encoder could not list its formats
    #[error("Failed to query encoder formats. Command: {command}. Return Code: {}", .exit_code.map_or_else(|| "terminated by signal".to_string(), |code| code.to_string()))]
    EncoderQueryFailed {
        command: String,
        exit_code: Option<i32>,
    },

    /// Menu token that names no known tool
    #[error("Not a valid tool selection: {token}")]
    UnknownTool { token: String },

    /// Host session could not answer a request
    #[error("Host command failed: {message}")]
    HostError { message: String },

    /// Configuration file could not be read or parsed
    #[error("Failed to load configuration from {path}: {message}")]
    ConfigFile { path: String, message: String },

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    GlobPattern(#[from] glob::PatternError),

    /// Name pattern could not be compiled
    #[error("Invalid name pattern: {0}")]
    Regex(#[from] regex::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for MPlay Batch operations
pub type MplayBatchResult<T> = std::result::Result<T, MplayBatchError>;
