use std::fmt;

/// `(major, minor, patch)` parsed from a dot-separated version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTriple {
  /// First segment.
  pub major: String,
  /// Second segment, `"0"` when absent.
  pub minor: String,
  /// Third segment, `"0"` when absent.
  pub patch: String,
}

impl VersionTriple {
  /// Split `version` on `.`, padding to three segments with `"0"` and ignoring any extras.
  ///
  /// A leading `v` (as in `v1.2.3`) and surrounding whitespace are dropped first.
  pub fn parse(version: &str) -> Self {
    let trimmed = version.trim();
    let trimmed = trimmed
      .strip_prefix(['v', 'V'])
      .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
      .unwrap_or(trimmed);

    let mut parts = trimmed
      .split('.')
      .map(str::trim)
      .map(|part| if part.is_empty() { "0" } else { part });
    let mut next = || parts.next().unwrap_or("0").to_string();

    let major = next();
    let minor = next();
    let patch = next();
    Self { major, minor, patch }
  }
}

impl fmt::Display for VersionTriple {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
  }
}
