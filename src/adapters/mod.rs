// Adapters - External system implementations

pub mod env_vars;
pub mod exec_ffmpeg;
pub mod hcommand_host;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use env_vars::EnvVarsAdapter;
pub use exec_ffmpeg::FFmpegAdapter;
pub use hcommand_host::HcommandHost;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::{init_logging, LogFormat};
