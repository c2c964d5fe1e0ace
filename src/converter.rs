//! Rewrite engine: scan a document, match references against the rule set and substitute.

use std::path::PathBuf;

use serde_json::Value;

use crate::error::{ConfigurationError, ConvertError};
use crate::fallback;
use crate::glob::normalise_path;
use crate::rules::{RuleMatch, RuleSet};
use crate::scanner::{AssetReference, scan};
use crate::template::{self, MatchContext, join_base};
use crate::versions::{ComponentsDirectory, PackageVersions, VersionCache};

/// Converter built once from configuration and reused across documents.
///
/// Conversion never mutates the converter, so a shared reference may be used from several
/// threads at once. Package versions are memoised per [`Converter::convert`] call only.
pub struct Converter {
  rules: RuleSet,
  versions: Box<dyn PackageVersions + Send + Sync>,
}

impl Converter {
  /// Validate `config` and build a converter.
  ///
  /// Versions are looked up in the components directory of the configured `projectRoot`
  /// (the working directory when absent); nothing is read until a package rule matches.
  pub fn new(config: &Value) -> Result<Self, ConfigurationError> {
    let rules = RuleSet::from_config(config)?;
    let project_root = rules
      .project_root
      .clone()
      .unwrap_or_else(|| PathBuf::from("."));
    let versions = ComponentsDirectory::for_project(project_root, rules.components_root.as_deref());

    tracing::debug!(rules = rules.rules().len(), "built converter");
    Ok(Self {
      rules,
      versions: Box::new(versions),
    })
  }

  /// Resolve package versions against the components directory of `project_root`.
  pub fn with_project_root(mut self, project_root: impl Into<PathBuf>) -> Self {
    let project_root = project_root.into();
    self.versions = Box::new(ComponentsDirectory::for_project(
      project_root.clone(),
      self.rules.components_root.as_deref(),
    ));
    self.rules.project_root = Some(project_root);
    self
  }

  /// Replace the version source entirely.
  pub fn with_versions(mut self, versions: impl PackageVersions + Send + Sync + 'static) -> Self {
    self.versions = Box::new(versions);
    self
  }

  /// Rules this converter evaluates.
  pub fn rules(&self) -> &RuleSet {
    &self.rules
  }

  /// Rewrite every matching reference in `text`.
  ///
  /// Unmatched references and all surrounding text are copied byte for byte, so a document
  /// with no matches comes back unchanged.
  pub fn convert(&self, text: &str) -> Result<String, ConvertError> {
    let mut versions = VersionCache::new(&*self.versions);
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut replaced = 0usize;

    for reference in scan(text) {
      if reference.span.start < cursor {
        continue;
      }

      let Some(found) = self.rules.find(reference.path) else {
        tracing::trace!(path = reference.path, "no rule matched");
        continue;
      };

      let cdn_path = self.render(&found, &reference, &mut versions)?;
      tracing::debug!(
        pattern = found.rule.glob.as_str(),
        path = reference.path,
        replacement = %cdn_path,
        "rewrote reference"
      );

      match (found.rule.test.as_deref(), &reference.script_element) {
        (Some(test), Some(element)) => {
          out.push_str(&text[cursor..element.start]);
          let cdn_element = format!(
            "{}{}{}",
            &text[element.start..reference.span.start],
            cdn_path,
            &text[reference.span.end..element.end]
          );
          out.push_str(&fallback::inject(&cdn_element, reference.value, test));
          cursor = element.end;
        }
        (test, _) => {
          if test.is_some() {
            tracing::warn!(
              path = reference.path,
              "fallback test ignored; reference is not a script element"
            );
          }
          out.push_str(&text[cursor..reference.span.start]);
          out.push_str(&cdn_path);
          cursor = reference.span.end;
        }
      }
      replaced += 1;
    }

    out.push_str(&text[cursor..]);
    tracing::debug!(replaced, "converted document");
    Ok(out)
  }

  fn render(
    &self,
    found: &RuleMatch<'_>,
    reference: &AssetReference<'_>,
    versions: &mut VersionCache<'_>,
  ) -> Result<String, ConvertError> {
    let relative = normalise_path(&found.relative_path).to_string();
    let mut context = MatchContext::new(reference.path, relative, &self.rules.default_cdn_base);

    if let Some(package) = found.rule.package.as_deref() {
      context.package = Some(package);
      context.version = Some(versions.get(package)?);
    }

    let rendered = match found.rule.cdn_template.as_deref() {
      Some(cdn_template) => template::render(cdn_template, &context)?,
      None => join_base(&self.rules.default_cdn_base, &context.filepath_rel),
    };
    Ok(rendered)
  }
}

/// Build a conversion closure from `config`, failing fast on invalid configuration.
pub fn make_converter(
  config: &Value,
) -> Result<impl Fn(&str) -> Result<String, ConvertError> + use<>, ConfigurationError> {
  let converter = Converter::new(config)?;
  Ok(move |text: &str| converter.convert(text))
}
