//! Environment variable adapter
//!
//! Reads `MPLAY_BATCH_*` overrides from the process environment.

use tracing::warn;

use crate::ports::{OverrideSource, SettingKey};

/// Environment variable override layer
#[derive(Debug, Default)]
pub struct EnvVarsAdapter;

impl EnvVarsAdapter {
    /// Create new environment adapter
    pub fn new() -> Self {
        Self
    }

    /// Get environment variable; unset and non-unicode values read as absent
    pub fn get_env(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(e) => {
                warn!("Ignoring environment variable {}: {}", key, e);
                None
            }
        }
    }
}

impl OverrideSource for EnvVarsAdapter {
    fn layer_name(&self) -> &str {
        "environment"
    }

    fn lookup(&self, key: SettingKey) -> Option<String> {
        self.get_env(key.env_var())
    }
}
