//! `${ name }` placeholder rendering over a per-reference match context.

use crate::error::TemplateRenderError;
use crate::versions::VersionTriple;

/// Variables available to a CDN template for one matched reference.
#[derive(Debug, Clone)]
pub struct MatchContext<'a> {
  /// Reference exactly as written in the document (without query or fragment).
  pub filepath: &'a str,
  /// Reference after relative-root handling; the path the rule matched.
  pub filepath_rel: String,
  /// Last path segment of the matched path.
  pub filename: String,
  /// `filename` with `.min` inserted before the extension unless already minified.
  pub filename_min: String,
  /// Package named by the winning rule.
  pub package: Option<&'a str>,
  /// Version of `package`, present only when the rule names one.
  pub version: Option<VersionTriple>,
  /// Default CDN base from the rule set.
  pub cdn_base: &'a str,
}

enum Variable<'a> {
  Value(&'a str),
  Owned(String),
  Unavailable,
  Unknown,
}

impl<'a> MatchContext<'a> {
  /// Build the filename-derived variables for `filepath_rel`.
  pub fn new(filepath: &'a str, filepath_rel: String, cdn_base: &'a str) -> Self {
    let filename = filepath_rel
      .rsplit('/')
      .next()
      .unwrap_or(filepath_rel.as_str())
      .to_string();
    let filename_min = minified_filename(&filename);

    Self {
      filepath,
      filepath_rel,
      filename,
      filename_min,
      package: None,
      version: None,
      cdn_base,
    }
  }

  fn variable(&self, name: &str) -> Variable<'_> {
    match name {
      "filename" => Variable::Value(&self.filename),
      "filenameMin" => Variable::Value(&self.filename_min),
      "filepath" => Variable::Value(self.filepath),
      "filepathRel" => Variable::Value(&self.filepath_rel),
      "defaultCDNBase" => Variable::Value(self.cdn_base),
      "package" => self.package.map_or(Variable::Unavailable, Variable::Value),
      "major" => self
        .version
        .as_ref()
        .map_or(Variable::Unavailable, |v| Variable::Value(&v.major)),
      "minor" => self
        .version
        .as_ref()
        .map_or(Variable::Unavailable, |v| Variable::Value(&v.minor)),
      "patch" => self
        .version
        .as_ref()
        .map_or(Variable::Unavailable, |v| Variable::Value(&v.patch)),
      "version" => self
        .version
        .as_ref()
        .map_or(Variable::Unavailable, |v| Variable::Owned(v.to_string())),
      _ => Variable::Unknown,
    }
  }
}

/// Insert `.min` before the extension of `filename`.
///
/// Names that already carry a `.min.` segment (or end in `.min`) are returned unchanged.
pub fn minified_filename(filename: &str) -> String {
  if filename.contains(".min.") || filename.ends_with(".min") {
    return filename.to_string();
  }

  match filename.rfind('.') {
    Some(dot) if dot > 0 => format!("{}.min{}", &filename[..dot], &filename[dot..]),
    _ => format!("{filename}.min"),
  }
}

/// Render `template`, replacing every `${ name }` with its value from `context`.
pub fn render(template: &str, context: &MatchContext<'_>) -> Result<String, TemplateRenderError> {
  let mut out = String::with_capacity(template.len());
  let mut rest = template;

  while let Some(open) = rest.find("${") {
    out.push_str(&rest[..open]);
    let after = &rest[open + 2..];
    let Some(close) = after.find('}') else {
      return Err(TemplateRenderError::Unterminated {
        template: template.to_string(),
      });
    };

    let name = after[..close].trim();
    match context.variable(name) {
      Variable::Value(value) => out.push_str(value),
      Variable::Owned(value) => out.push_str(&value),
      Variable::Unavailable => {
        return Err(TemplateRenderError::Unavailable {
          name: name.to_string(),
          template: template.to_string(),
        });
      }
      Variable::Unknown => {
        return Err(TemplateRenderError::UnknownPlaceholder {
          name: name.to_string(),
          template: template.to_string(),
        });
      }
    }

    rest = &after[close + 1..];
  }

  out.push_str(rest);
  Ok(out)
}

/// Join a CDN base and a relative path with exactly one `/` between them.
pub fn join_base(base: &str, path: &str) -> String {
  let path = path.trim_start_matches('/');
  if base.is_empty() {
    return path.to_string();
  }
  format!("{}/{}", base.trim_end_matches('/'), path)
}
