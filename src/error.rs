//! Error taxonomy shared by rule construction, version resolution and rendering.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed or empty configuration, raised while building a converter.
#[derive(Debug, Error)]
pub enum ConfigurationError {
  /// No configuration was supplied at all.
  #[error("no configuration supplied; expected a list of file patterns or an object with `files`")]
  Missing,
  /// The top-level value is neither a sequence nor an object.
  #[error("configuration must be a list of file patterns or an object, found {found}")]
  InvalidShape {
    /// JSON type name of the rejected value.
    found: &'static str,
  },
  /// The object form has no `files` key.
  #[error("configuration object is missing the `files` list")]
  MissingFiles,
  /// `files` is present but is not a sequence.
  #[error("`files` must be a list, found {found}")]
  InvalidFiles {
    /// JSON type name of the rejected value.
    found: &'static str,
  },
  /// `files` is an empty sequence.
  #[error("`files` must contain at least one entry")]
  EmptyFiles,
  /// A single file entry could not be normalised into a rule.
  #[error("invalid file entry at index {index}: {reason}")]
  InvalidEntry {
    /// Position of the entry within `files`.
    index: usize,
    /// Human readable description of the problem.
    reason: String,
  },
  /// A global option has the wrong type.
  #[error("option `{option}` must be a string, found {found}")]
  InvalidOption {
    /// Name of the offending option.
    option: &'static str,
    /// JSON type name of the rejected value.
    found: &'static str,
  },
  /// The glob pattern of a file entry failed to compile.
  #[error("invalid file pattern `{pattern}`: {reason}")]
  InvalidPattern {
    /// Pattern as written in the configuration.
    pattern: String,
    /// Description of the syntax problem.
    reason: String,
  },
}

/// A rule names a package whose version cannot be determined.
#[derive(Debug, Error)]
pub enum PackageResolutionError {
  /// None of the candidate manifests exist.
  #[error("no manifest found for package `{package}` (searched {})", display_paths(.searched))]
  ManifestNotFound {
    /// Package that was requested.
    package: String,
    /// Manifest locations that were tried, in order.
    searched: Vec<PathBuf>,
  },
  /// A manifest exists but could not be read.
  #[error("failed to read manifest {}", .path.display())]
  Read {
    /// Manifest path.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// A manifest is not valid JSON.
  #[error("failed to parse manifest {}", .path.display())]
  Parse {
    /// Manifest path.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
  /// Manifests were found but none carries a usable `version` string.
  #[error("package `{package}` has no usable version")]
  MissingVersion {
    /// Package that was requested.
    package: String,
  },
}

/// A template could not be rendered for a matched reference.
#[derive(Debug, Error)]
pub enum TemplateRenderError {
  /// The template names a placeholder the renderer does not know.
  #[error("unknown placeholder `{name}` in template `{template}`")]
  UnknownPlaceholder {
    /// Placeholder name.
    name: String,
    /// Template text.
    template: String,
  },
  /// The placeholder is known but has no value for this match.
  #[error("placeholder `{name}` has no value in template `{template}`; version placeholders need a `package`")]
  Unavailable {
    /// Placeholder name.
    name: String,
    /// Template text.
    template: String,
  },
  /// A `${` opener without a closing brace.
  #[error("unterminated placeholder in template `{template}`")]
  Unterminated {
    /// Template text.
    template: String,
  },
}

/// Failure while converting a single document.
#[derive(Debug, Error)]
pub enum ConvertError {
  /// Version interpolation was requested but failed.
  #[error(transparent)]
  Package(#[from] PackageResolutionError),
  /// The replacement template could not be rendered.
  #[error(transparent)]
  Template(#[from] TemplateRenderError),
}

fn display_paths(paths: &[PathBuf]) -> String {
  paths
    .iter()
    .map(|path| path.display().to_string())
    .collect::<Vec<_>>()
    .join(", ")
}
