//! Rule set construction from loosely-typed configuration.
//!
//! Two shapes are accepted: a bare list of glob strings, or an object carrying a `files` list
//! plus optional global defaults. Both are validated once and normalised into a [`RuleSet`].

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::ConfigurationError;
use crate::glob::{Glob, normalise_path};

/// One normalised file rule.
#[derive(Debug, Clone)]
pub struct Rule {
  /// Compiled file pattern.
  pub glob: Glob,
  /// Explicit CDN template; `None` renders the default base joined with the path.
  pub cdn_template: Option<String>,
  /// Package whose version feeds `${ major }`, `${ minor }` and `${ patch }`.
  pub package: Option<String>,
  /// Runtime expression that must be truthy once the CDN script loaded.
  pub test: Option<String>,
  /// Rule-level relative root overriding the global one.
  pub relative_root: Option<String>,
}

/// Ordered rules plus global defaults, evaluated first-match-wins.
#[derive(Debug, Clone)]
pub struct RuleSet {
  rules: Vec<Rule>,
  /// Base URL for rules without an explicit template.
  pub default_cdn_base: String,
  /// Global relative root.
  pub relative_root: Option<String>,
  /// Explicit components directory for version lookups.
  pub components_root: Option<String>,
  /// Directory against which components lookups are resolved.
  pub project_root: Option<PathBuf>,
}

/// Winning rule for a reference together with the path it matched.
#[derive(Debug)]
pub struct RuleMatch<'a> {
  /// The first rule whose pattern matched.
  pub rule: &'a Rule,
  /// Reference path after relative-root handling.
  pub relative_path: String,
}

enum RawConfig<'a> {
  Patterns(&'a [Value]),
  Object(&'a Map<String, Value>),
}

impl<'a> RawConfig<'a> {
  fn classify(config: &'a Value) -> Result<Self, ConfigurationError> {
    match config {
      Value::Null => Err(ConfigurationError::Missing),
      Value::Array(items) => Ok(Self::Patterns(items)),
      Value::Object(map) => Ok(Self::Object(map)),
      other => Err(ConfigurationError::InvalidShape {
        found: type_name(other),
      }),
    }
  }
}

impl RuleSet {
  /// Validate `config` and build the rule set, failing fast on any malformed entry.
  pub fn from_config(config: &Value) -> Result<Self, ConfigurationError> {
    let (files, options) = match RawConfig::classify(config)? {
      RawConfig::Patterns(items) => (items, None),
      RawConfig::Object(map) => {
        let files = match map.get("files") {
          None | Some(Value::Null) => return Err(ConfigurationError::MissingFiles),
          Some(Value::Array(items)) => items.as_slice(),
          Some(other) => {
            return Err(ConfigurationError::InvalidFiles {
              found: type_name(other),
            });
          }
        };
        (files, Some(map))
      }
    };

    if files.is_empty() {
      return Err(ConfigurationError::EmptyFiles);
    }

    let rules = files
      .iter()
      .enumerate()
      .map(|(index, entry)| parse_rule(index, entry))
      .collect::<Result<Vec<_>, _>>()?;

    let mut set = Self {
      rules,
      default_cdn_base: String::new(),
      relative_root: None,
      components_root: None,
      project_root: None,
    };

    if let Some(options) = options {
      set.default_cdn_base = global_option(options, "defaultCDNBase")?.unwrap_or_default();
      set.relative_root = global_option(options, "relativeRoot")?;
      set.components_root = match global_option(options, "bowerComponents")? {
        Some(root) => Some(root),
        None => global_option(options, "componentsRoot")?,
      };
      set.project_root = global_option(options, "projectRoot")?.map(PathBuf::from);
    }

    Ok(set)
  }

  /// Rules in declaration order.
  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  /// Find the first rule matching `path`; later matching rules are never consulted.
  pub fn find(&self, path: &str) -> Option<RuleMatch<'_>> {
    self.rules.iter().find_map(|rule| {
      let root = rule.relative_root.as_deref().or(self.relative_root.as_deref());
      let relative_path = apply_relative_root(path, root);
      rule
        .glob
        .is_match(&relative_path)
        .then_some(RuleMatch { rule, relative_path })
    })
  }
}

fn parse_rule(index: usize, entry: &Value) -> Result<Rule, ConfigurationError> {
  let invalid = |reason: String| ConfigurationError::InvalidEntry { index, reason };

  let (pattern, fields) = match entry {
    Value::String(pattern) => (pattern.as_str(), None),
    Value::Object(fields) => match fields.get("file") {
      Some(Value::String(pattern)) => (pattern.as_str(), Some(fields)),
      Some(other) => {
        return Err(invalid(format!(
          "`file` must be a string, found {}",
          type_name(other)
        )));
      }
      None => return Err(invalid("object entries need a string `file`".into())),
    },
    other => {
      return Err(invalid(format!(
        "expected a pattern string or an object, found {}",
        type_name(other)
      )));
    }
  };

  if pattern.trim().is_empty() {
    return Err(invalid("file pattern is empty".into()));
  }

  let glob = Glob::new(pattern).map_err(|err| ConfigurationError::InvalidPattern {
    pattern: pattern.to_string(),
    reason: err.reason,
  })?;

  let field = |name: &str| -> Result<Option<String>, ConfigurationError> {
    match fields.and_then(|fields| fields.get(name)) {
      None | Some(Value::Null) => Ok(None),
      Some(Value::String(value)) => Ok(Some(value.clone())),
      Some(other) => Err(invalid(format!(
        "`{name}` must be a string, found {}",
        type_name(other)
      ))),
    }
  };

  Ok(Rule {
    glob,
    cdn_template: field("cdn")?,
    package: field("package")?.filter(|package| !package.trim().is_empty()),
    test: field("test")?.filter(|test| !test.trim().is_empty()),
    relative_root: field("relativeRoot")?,
  })
}

fn global_option(
  options: &Map<String, Value>,
  option: &'static str,
) -> Result<Option<String>, ConfigurationError> {
  match options.get(option) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(value)) => Ok(Some(value.clone())),
    Some(other) => Err(ConfigurationError::InvalidOption {
      option,
      found: type_name(other),
    }),
  }
}

/// Re-express `path` relative to `root`.
///
/// Leading `./` and `/` segments are dropped first, so `./img/a.png` and `img/a.png` are
/// treated alike. A path that then starts with `root/` loses that prefix; a `../` path is
/// resolved against `root`. Any other path is returned without the dropped leading segments.
pub fn apply_relative_root(path: &str, root: Option<&str>) -> String {
  let root = root
    .map(|root| normalise_path(root).trim_end_matches('/'))
    .filter(|root| !root.is_empty() && *root != ".");
  let Some(root) = root else {
    return path.to_string();
  };

  let local = normalise_path(path);
  if let Some(rest) = local
    .strip_prefix(root)
    .and_then(|rest| rest.strip_prefix('/'))
  {
    return rest.to_string();
  }

  if !local.starts_with("../") {
    return local.to_string();
  }

  let mut segments: Vec<&str> = root.split('/').filter(|s| !s.is_empty()).collect();
  for segment in local.split('/') {
    match segment {
      "" | "." => {}
      ".." => {
        if segments.pop().is_none() {
          // escaped above the root; keep the reference as written
          return path.to_string();
        }
      }
      other => segments.push(other),
    }
  }
  segments.join("/")
}

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "a list",
    Value::Object(_) => "an object",
  }
}
