use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::native::DEFAULT_TEMPLATE;
use crate::view::DocumentTracking;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read view config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Settings applied to view types when they are built. Read once by the
/// host and handed to each builder; nothing here is global.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Scan disposed views for native nodes they still reference.
    pub dev: bool,
    pub document_tracking: DocumentTracking,
    /// Template used by view types that do not set their own.
    pub template: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            dev: false,
            document_tracking: DocumentTracking::Inherit,
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)?;
                Ok(serde_yaml::from_str(&contents)?)
            }
            _ => Ok(Self::default()),
        }
    }
}
