use std::collections::HashMap;

use super::{PackageVersions, VersionTriple};
use crate::error::PackageResolutionError;

/// Read-through memo of parsed versions, scoped to one document conversion.
pub struct VersionCache<'a> {
  source: &'a dyn PackageVersions,
  resolved: HashMap<String, VersionTriple>,
}

impl<'a> VersionCache<'a> {
  /// Wrap `source` with an empty cache.
  pub fn new(source: &'a dyn PackageVersions) -> Self {
    Self {
      source,
      resolved: HashMap::new(),
    }
  }

  /// Version triple for `package`, consulting the source only on first request.
  pub fn get(&mut self, package: &str) -> Result<VersionTriple, PackageResolutionError> {
    if let Some(triple) = self.resolved.get(package) {
      return Ok(triple.clone());
    }

    let raw = self.source.version_of(package)?;
    let triple = VersionTriple::parse(&raw);
    tracing::debug!(package, version = %triple, "resolved package version");

    self.resolved.insert(package.to_string(), triple.clone());
    Ok(triple)
  }
}
