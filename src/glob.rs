//! Filesystem-style glob patterns compiled into anchored regular expressions.
//!
//! Supported syntax: `*` (any run within one path segment), `**` (any number of segments,
//! including none), `?` (one character within a segment), `{a,b}` alternation (nestable),
//! `[abc]` / `[a-z]` / `[!abc]` classes and `\` escapes. Everything else is literal.

use std::fmt;

use regex::Regex;

/// Syntax problem found while compiling a glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobError {
  /// Description of the problem.
  pub reason: String,
}

impl fmt::Display for GlobError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.reason)
  }
}

impl std::error::Error for GlobError {}

/// Compiled glob predicate.
#[derive(Debug, Clone)]
pub struct Glob {
  pattern: String,
  regex: Regex,
}

impl Glob {
  /// Compile `pattern`, rejecting empty patterns and unbalanced groups.
  pub fn new(pattern: &str) -> Result<Self, GlobError> {
    let normalised = normalise_path(pattern);
    if normalised.is_empty() {
      return Err(GlobError {
        reason: "pattern is empty".into(),
      });
    }

    let chars: Vec<char> = normalised.chars().collect();
    let mut compiler = Compiler {
      chars: &chars,
      pos: 0,
      brace_depth: 0,
    };
    let body = compiler.sequence()?;
    let regex = Regex::new(&format!("^{body}$")).map_err(|err| GlobError {
      reason: err.to_string(),
    })?;

    Ok(Self {
      pattern: pattern.to_string(),
      regex,
    })
  }

  /// Pattern as originally written.
  pub fn as_str(&self) -> &str {
    &self.pattern
  }

  /// Test a reference path; leading `./` and `/` are ignored on both sides.
  pub fn is_match(&self, path: &str) -> bool {
    self.regex.is_match(normalise_path(path))
  }
}

/// Strip the leading `./` and `/` segments that do not affect which file a path names.
pub fn normalise_path(path: &str) -> &str {
  let mut rest = path;
  loop {
    if let Some(stripped) = rest.strip_prefix("./") {
      rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('/') {
      rest = stripped;
    } else {
      return rest;
    }
  }
}

struct Compiler<'a> {
  chars: &'a [char],
  pos: usize,
  brace_depth: usize,
}

impl Compiler<'_> {
  fn peek(&self) -> Option<char> {
    self.chars.get(self.pos).copied()
  }

  fn at_segment_start(&self) -> bool {
    self.pos == 0 || matches!(self.chars.get(self.pos - 1), Some('/') | Some('{') | Some(','))
  }

  /// Compile until end of input, or until `,`/`}` when inside braces.
  fn sequence(&mut self) -> Result<String, GlobError> {
    let mut out = String::new();

    while let Some(c) = self.peek() {
      match c {
        ',' | '}' if self.brace_depth > 0 => break,
        '*' => out.push_str(&self.star()),
        '?' => {
          self.pos += 1;
          out.push_str("[^/]");
        }
        '{' => out.push_str(&self.alternation()?),
        '[' => out.push_str(&self.class()?),
        '\\' => {
          self.pos += 1;
          let Some(escaped) = self.peek() else {
            return Err(GlobError {
              reason: "trailing escape character".into(),
            });
          };
          self.pos += 1;
          out.push_str(&regex::escape(&escaped.to_string()));
        }
        '}' => {
          return Err(GlobError {
            reason: "unmatched `}`".into(),
          });
        }
        other => {
          self.pos += 1;
          out.push_str(&regex::escape(&other.to_string()));
        }
      }
    }

    Ok(out)
  }

  fn star(&mut self) -> String {
    let segment_start = self.at_segment_start();
    let mut count = 0;
    while self.peek() == Some('*') {
      self.pos += 1;
      count += 1;
    }

    if count < 2 {
      return "[^/]*".into();
    }

    match self.peek() {
      // `**/` at a segment boundary spans zero or more whole directories.
      Some('/') if segment_start => {
        self.pos += 1;
        "(?:.*/)?".into()
      }
      _ => ".*".into(),
    }
  }

  fn alternation(&mut self) -> Result<String, GlobError> {
    self.pos += 1;
    self.brace_depth += 1;
    let mut branches = Vec::new();

    loop {
      branches.push(self.sequence()?);
      match self.peek() {
        Some(',') => self.pos += 1,
        Some('}') => {
          self.pos += 1;
          break;
        }
        _ => {
          return Err(GlobError {
            reason: "unclosed `{`".into(),
          });
        }
      }
    }

    self.brace_depth -= 1;
    Ok(format!("(?:{})", branches.join("|")))
  }

  fn class(&mut self) -> Result<String, GlobError> {
    let start = self.pos;
    self.pos += 1;
    let mut out = String::from("[");

    if matches!(self.peek(), Some('!') | Some('^')) {
      self.pos += 1;
      out.push('^');
    }

    let mut first = true;
    loop {
      let Some(c) = self.peek() else {
        return Err(GlobError {
          reason: format!("unclosed `[` at position {start}"),
        });
      };
      self.pos += 1;
      match c {
        ']' if !first => break,
        '-' if !first && self.peek() != Some(']') => out.push('-'),
        '/' => {
          return Err(GlobError {
            reason: "character class cannot contain `/`".into(),
          });
        }
        other => out.push_str(&regex::escape(&other.to_string())),
      }
      first = false;
    }

    // keep classes inside one segment
    if out.starts_with("[^") {
      out.push('/');
    }
    out.push(']');
    Ok(out)
  }
}
