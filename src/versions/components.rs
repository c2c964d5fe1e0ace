//! Filesystem-backed version lookup over an installed components directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;
use serde_json::Value;

use super::PackageVersions;
use crate::error::PackageResolutionError;

/// Directory used when neither an explicit root nor an rc file names one.
pub const DEFAULT_COMPONENTS_DIR: &str = "bower_components";

/// Project-level file whose `directory` field names the components directory.
pub const RC_FILE: &str = ".bowerrc";

/// Manifest names tried inside a package directory, in order.
pub const MANIFEST_FILES: [&str; 3] = [".bower.json", "bower.json", "package.json"];

#[derive(Debug, Default, Deserialize)]
struct ComponentsRc {
  #[serde(default)]
  directory: Option<String>,
}

/// Package manifests installed under a project's components directory.
///
/// The directory itself is located on first use, so building one performs no I/O.
#[derive(Debug, Clone)]
pub struct ComponentsDirectory {
  project_root: PathBuf,
  explicit: Option<PathBuf>,
  root: OnceLock<PathBuf>,
}

impl ComponentsDirectory {
  /// Use `root` directly as the components directory.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      project_root: PathBuf::new(),
      explicit: Some(root.into()),
      root: OnceLock::new(),
    }
  }

  /// Components directory of the project at `project_root`.
  ///
  /// An explicit root wins (relative paths are taken from `project_root`), then the
  /// `directory` named by the project's rc file, then the conventional default directory.
  pub fn for_project(project_root: impl Into<PathBuf>, explicit: Option<&str>) -> Self {
    Self {
      project_root: project_root.into(),
      explicit: explicit.map(PathBuf::from),
      root: OnceLock::new(),
    }
  }

  /// Resolved components root.
  pub fn root(&self) -> &Path {
    self.root.get_or_init(|| self.locate())
  }

  fn locate(&self) -> PathBuf {
    if let Some(explicit) = &self.explicit {
      return self.project_root.join(explicit);
    }

    if let Some(directory) = read_rc_directory(&self.project_root.join(RC_FILE)) {
      return self.project_root.join(directory);
    }

    self.project_root.join(DEFAULT_COMPONENTS_DIR)
  }
}

impl PackageVersions for ComponentsDirectory {
  fn version_of(&self, package: &str) -> Result<String, PackageResolutionError> {
    let package_dir = self.root().join(package);
    let mut searched = Vec::new();
    let mut found_any = false;

    for name in MANIFEST_FILES {
      let path = package_dir.join(name);
      let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
          searched.push(path);
          continue;
        }
        Err(err) => return Err(PackageResolutionError::Read { path, source: err }),
      };
      found_any = true;

      let manifest: Value = serde_json::from_str(&contents)
        .map_err(|err| PackageResolutionError::Parse { path: path.clone(), source: err })?;
      if let Some(version) = manifest.get("version").and_then(Value::as_str)
        && !version.trim().is_empty()
      {
        tracing::trace!(package, manifest = %path.display(), version, "read package manifest");
        return Ok(version.to_string());
      }
      searched.push(path);
    }

    if found_any {
      Err(PackageResolutionError::MissingVersion {
        package: package.to_string(),
      })
    } else {
      Err(PackageResolutionError::ManifestNotFound {
        package: package.to_string(),
        searched,
      })
    }
  }
}

/// Read the rc file's `directory`, treating a missing or malformed file as absent.
fn read_rc_directory(path: &Path) -> Option<String> {
  let content = fs::read_to_string(path).ok()?;
  let rc: ComponentsRc = match serde_json::from_str(&content) {
    Ok(rc) => rc,
    Err(err) => {
      tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable components rc file");
      return None;
    }
  };
  rc.directory.filter(|dir| !dir.trim().is_empty())
}
