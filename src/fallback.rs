//! Runtime fallback markup for CDN scripts guarded by a test expression.

/// Replace a script element with its CDN variant followed by an inline load check.
///
/// `cdn_element` is the original element with its `src` already pointing at the CDN. The
/// generated check evaluates `test` in the browser once that element has run and, when it is
/// falsy, writes a script element for `local_path` so the page keeps working offline. `test`
/// is copied verbatim; it is never evaluated here.
pub fn inject(cdn_element: &str, local_path: &str, test: &str) -> String {
  format!(
    "{cdn_element}<script>if(!({test})) document.write('<script src=\"{local}\"><\\/script>');</script>",
    local = escape_script_string(local_path),
  )
}

/// Escape a value for the single-quoted string passed to `document.write` inside an inline
/// `<script>` body, where it becomes the `src` attribute of the written element.
fn escape_script_string(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\'' => out.push_str("\\'"),
      '"' => out.push_str("&quot;"),
      '<' => out.push_str("\\x3C"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      other => out.push(other),
    }
  }
  out
}
