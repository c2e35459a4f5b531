// TOML config adapter - Configuration overrides from a TOML file

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{MplayBatchError, MplayBatchResult};
use crate::ports::{OverrideSource, SettingKey};

/// Table holding the tool's settings
pub const CONFIG_TABLE: &str = "mplay_batch";

/// TOML configuration adapter
///
/// ```toml
/// [mplay_batch]
/// extension = "exr"
/// video_format = "mov"
/// flipbook_dir = "__JOB__/flip"
/// pad_sub_version = 3
/// output_video = true
/// ```
#[derive(Debug, Default)]
pub struct TomlConfigAdapter {
    config: HashMap<String, String>,
    config_file_path: Option<PathBuf>,
}

impl TomlConfigAdapter {
    /// Create an empty adapter
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from file
    pub fn load(file_path: &Path) -> MplayBatchResult<Self> {
        let content = std::fs::read_to_string(file_path).map_err(|e| {
            MplayBatchError::ConfigFile {
                path: file_path.display().to_string(),
                message: e.to_string(),
            }
        })?;

        let mut adapter = Self::from_toml_str(&content).map_err(|e| match e {
            MplayBatchError::ConfigFile { message, .. } => MplayBatchError::ConfigFile {
                path: file_path.display().to_string(),
                message,
            },
            other => other,
        })?;
        adapter.config_file_path = Some(file_path.to_path_buf());

        info!("Loaded configuration from: {}", file_path.display());
        Ok(adapter)
    }

    /// Deserialize config from TOML string
    pub fn from_toml_str(toml_content: &str) -> MplayBatchResult<Self> {
        let parsed: toml::Table = toml::from_str(toml_content).map_err(|e| {
            MplayBatchError::ConfigFile {
                path: "<inline>".to_string(),
                message: e.to_string(),
            }
        })?;

        let mut config = HashMap::new();
        if let Some(table) = parsed.get(CONFIG_TABLE).and_then(toml::Value::as_table) {
            for (key, value) in table {
                if !SettingKey::ALL.iter().any(|k| k.file_key() == key.as_str()) {
                    warn!("Ignoring unknown config key: {}", key);
                    continue;
                }
                match Self::value_to_string(value) {
                    Some(text) => {
                        config.insert(key.clone(), text);
                    }
                    None => debug!("Skipping non-scalar config value for {}", key),
                }
            }
        }

        Ok(Self {
            config,
            config_file_path: None,
        })
    }

    /// Path the configuration was loaded from
    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    /// Booleans map onto the `1`/`0` form of the menu toggles
    fn value_to_string(value: &toml::Value) -> Option<String> {
        match value {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            toml::Value::Float(f) => Some(f.to_string()),
            toml::Value::Boolean(b) => Some(if *b { "1" } else { "0" }.to_string()),
            _ => None,
        }
    }
}

impl OverrideSource for TomlConfigAdapter {
    fn layer_name(&self) -> &str {
        "config file"
    }

    fn lookup(&self, key: SettingKey) -> Option<String> {
        self.config.get(key.file_key()).cloned()
    }
}
