use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Config file could not be read.
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Config contents are not valid JSON for a `StoreConfig`.
  #[error("invalid config: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("unknown node kind: {0}")]
  UnknownNodeKind(String),

  #[error("unknown branch slot: '{0}' (expected 'true' or 'false')")]
  UnknownBranchSlot(String),
}
