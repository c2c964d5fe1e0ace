//! Rule configuration file discovery and loading.
//!
//! Files hold the same loosely-typed shapes accepted by [`crate::Converter::new`]; YAML files
//! are converted into JSON values so validation happens in one place.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// File names searched by [`discover`], in order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["cdn-swap.json", "cdn-swap.yaml", "cdn-swap.yml"];

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
  /// The file could not be read.
  #[error("failed to read {}", .path.display())]
  Io {
    /// File that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// The file is not valid JSON.
  #[error("failed to parse {} as JSON", .path.display())]
  Json {
    /// File that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
  /// The file is not valid YAML, or uses YAML features JSON cannot express.
  #[error("failed to parse {} as YAML", .path.display())]
  Yaml {
    /// File that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_yaml::Error,
  },
}

/// Locate the first configuration file present in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
  CONFIG_FILE_NAMES
    .iter()
    .map(|name| dir.join(name))
    .find(|candidate| candidate.is_file())
}

/// Read a configuration file, choosing the format from its extension (JSON by default).
pub fn load_config(path: &Path) -> Result<Value, ConfigFileError> {
  let content = fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
    path: path.to_path_buf(),
    source,
  })?;

  let is_yaml = path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

  if is_yaml {
    serde_yaml::from_str(&content).map_err(|source| ConfigFileError::Yaml {
      path: path.to_path_buf(),
      source,
    })
  } else {
    serde_json::from_str(&content).map_err(|source| ConfigFileError::Json {
      path: path.to_path_buf(),
      source,
    })
  }
}
