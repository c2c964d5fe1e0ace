//! Package version lookup used for `${ major }`-style template interpolation.
//!
//! A [`PackageVersions`] source maps a package name to its raw version string. The converter
//! wraps whichever source it was given in a [`VersionCache`] that lives for a single document
//! conversion, so each manifest is read at most once per call and never shared across calls.

mod cache;
mod components;
mod triple;

pub use cache::VersionCache;
pub use components::{ComponentsDirectory, DEFAULT_COMPONENTS_DIR, MANIFEST_FILES, RC_FILE};
pub use triple::VersionTriple;

use std::collections::BTreeMap;

use crate::error::PackageResolutionError;

/// Read-only lookup from package name to version string.
pub trait PackageVersions {
  /// Return the raw version string recorded for `package`.
  fn version_of(&self, package: &str) -> Result<String, PackageResolutionError>;
}

/// In-memory version table, useful when versions come from somewhere other than disk.
#[derive(Debug, Clone, Default)]
pub struct StaticVersions {
  versions: BTreeMap<String, String>,
}

impl StaticVersions {
  /// Create an empty table.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record `version` for `package`, replacing any previous entry.
  pub fn with(mut self, package: impl Into<String>, version: impl Into<String>) -> Self {
    self.versions.insert(package.into(), version.into());
    self
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticVersions {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      versions: iter
        .into_iter()
        .map(|(package, version)| (package.into(), version.into()))
        .collect(),
    }
  }
}

impl PackageVersions for StaticVersions {
  fn version_of(&self, package: &str) -> Result<String, PackageResolutionError> {
    self
      .versions
      .get(package)
      .cloned()
      .ok_or_else(|| PackageResolutionError::MissingVersion {
        package: package.to_string(),
      })
  }
}
