use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::enums::SlotPolicy;
use crate::error::ConfigError;

/// Settings for a workflow store.
///
/// ```json
/// {
///   "slot_policy": "overwrite",
///   "root_id": "start",
///   "root_label": "Start"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  /// How adds into an occupied branch slot are handled.
  pub slot_policy: SlotPolicy,

  /// Id given to the start node of a new workflow.
  pub root_id: String,

  /// Label given to the start node of a new workflow.
  pub root_label: String,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      slot_policy: SlotPolicy::default(),
      root_id: "start".to_string(),
      root_label: "Start".to_string(),
    }
  }
}

impl StoreConfig {
  pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(content)?)
  }

  /// Load settings from a JSON file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json_str(&content)
  }

  /// Load settings from `path` if it exists, otherwise fall back to defaults.
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    if path.exists() {
      Self::load(path)
    } else {
      Ok(Self::default())
    }
  }
}
