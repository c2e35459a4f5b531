// Tracing log adapter - Structured logging using tracing crate

use std::str::FromStr;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::error::MplayBatchError;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogFormat {
    /// Human-readable text format
    Pretty,
    /// JSON format for structured logging
    Json,
}

impl FromStr for LogFormat {
    type Err = MplayBatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(MplayBatchError::InvalidVariableValue {
                var: "log-format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Validate a log level name
pub fn parse_log_level(level: &str) -> Result<tracing::Level, MplayBatchError> {
    tracing::Level::from_str(level).map_err(|_| MplayBatchError::InvalidVariableValue {
        var: "log-level".to_string(),
        value: level.to_string(),
    })
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Logs go to stderr so
/// stdout stays free for command output. Calling this twice is harmless.
pub fn init_logging(default_level: tracing::Level, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
