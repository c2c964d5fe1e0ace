use std::ops::Range;
use std::sync::OnceLock;

use regex::{CaptureMatches, Captures, Regex};

use super::filters::should_skip_reference;

/// Where a reference was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Quoted `src`, `href` or `data-src` attribute value.
    Attribute,
    /// Body of a stylesheet `url(...)` construct.
    UrlFunction,
}

/// One local asset reference located in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference<'t> {
    /// Byte range of `path` within the scanned text.
    pub span: Range<usize>,
    /// Referenced path, without surrounding whitespace, query string or fragment.
    pub path: &'t str,
    /// Whole value as written, trimmed but keeping any query string or fragment.
    pub value: &'t str,
    /// Syntactic context of the reference.
    pub kind: ReferenceKind,
    /// Byte range of the whole `<script ...></script>` element when the reference is its `src`.
    pub script_element: Option<Range<usize>>,
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?i)\s(?:src|href|data-src)\s*=\s*(?:"(?P<adq>[^"]*)"|'(?P<asq>[^']*)')|url\(\s*(?:"(?P<udq>[^"]*)"|'(?P<usq>[^']*)'|(?P<ubare>[^)"'\s]*))\s*\)"#,
        )
        .expect("invalid reference regex")
    })
}

fn script_open_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^<script[\s>]").expect("invalid script open regex"))
}

fn script_close_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[^>]*>\s*</script\s*>").expect("invalid script close regex")
    })
}

/// Lazy left-to-right iterator over the local references of a document.
pub struct References<'t> {
    text: &'t str,
    matches: CaptureMatches<'static, 't>,
}

/// Scan `text` for asset references.
///
/// Scanning does not mutate anything; calling it again on the same text yields the same
/// sequence. Matches never overlap because attribute values and `url()` bodies do not nest.
pub fn scan(text: &str) -> References<'_> {
    References {
        text,
        matches: reference_pattern().captures_iter(text),
    }
}

impl<'t> Iterator for References<'t> {
    type Item = AssetReference<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        for caps in self.matches.by_ref() {
            if let Some(reference) = to_reference(self.text, &caps) {
                return Some(reference);
            }
        }
        None
    }
}

fn to_reference<'t>(text: &'t str, caps: &Captures<'t>) -> Option<AssetReference<'t>> {
    let whole = caps.get(0)?;
    let (value, kind) = if let Some(value) = caps.name("adq").or_else(|| caps.name("asq")) {
        (value, ReferenceKind::Attribute)
    } else {
        let value = caps
            .name("udq")
            .or_else(|| caps.name("usq"))
            .or_else(|| caps.name("ubare"))?;
        (value, ReferenceKind::UrlFunction)
    };

    let raw = value.as_str();
    if should_skip_reference(raw) {
        tracing::trace!(value = raw, "skipping non-local reference");
        return None;
    }

    let leading = raw.len() - raw.trim_start().len();
    let trimmed = raw.trim();
    let path = trimmed
        .find(['?', '#'])
        .map_or(trimmed, |end| &trimmed[..end]);
    if path.is_empty() {
        return None;
    }

    let start = value.start() + leading;
    let span = start..start + path.len();

    let script_element = match kind {
        ReferenceKind::Attribute => script_element(text, whole.start(), whole.end()),
        ReferenceKind::UrlFunction => None,
    };

    Some(AssetReference {
        span,
        path: &text[start..start + path.len()],
        value: &text[start..start + trimmed.len()],
        kind,
        script_element,
    })
}

/// Extent of the `<script ...></script>` element owning the attribute at `attr_start..attr_end`.
///
/// The owning tag is the nearest `<` before the attribute with no `>` in between.
fn script_element(text: &str, attr_start: usize, attr_end: usize) -> Option<Range<usize>> {
    let open = text[..attr_start].rfind('<')?;
    if text[open..attr_start].contains('>') || !script_open_pattern().is_match(&text[open..]) {
        return None;
    }
    let close = script_close_pattern().find(&text[attr_end..])?;
    Some(open..attr_end + close.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(text: &str) -> Vec<&str> {
        scan(text).map(|reference| reference.path).collect()
    }

    #[test]
    fn finds_script_and_link_attributes_in_order() {
        let html = r#"<link rel="stylesheet" href="css/main.css">
<script src='js/app.js'></script>
<img data-src="img/lazy.png" alt="">"#;
        assert_eq!(paths(html), vec!["css/main.css", "js/app.js", "img/lazy.png"]);
    }

    #[test]
    fn finds_url_functions_with_and_without_quotes() {
        let css = r#"a { background: url(../img/a.png); }
b { background: url( "img/b.gif" ); }
c { background: url('img/c.jpg') no-repeat; }"#;
        assert_eq!(paths(css), vec!["../img/a.png", "img/b.gif", "img/c.jpg"]);
    }

    #[test]
    fn skips_remote_references() {
        let html = r#"<script src="//cdn/x.js"></script><script src="https://a/b.js"></script>
<style>i { background: url(data:image/png;base64,AAAA); }</style>"#;
        assert!(paths(html).is_empty());
    }

    #[test]
    fn span_excludes_query_and_fragment() {
        let html = r#"<script src=" js/app.js?v=3 "></script>"#;
        let reference = scan(html).next().unwrap();
        assert_eq!(reference.path, "js/app.js");
        assert_eq!(&html[reference.span.clone()], "js/app.js");
        assert_eq!(&html[reference.span.end..reference.span.end + 4], "?v=3");
    }

    #[test]
    fn records_script_element_extent() {
        let html = "<p></p><script type=\"text/javascript\" src=\"js/a.js\" defer>\n</script><p></p>";
        let reference = scan(html).next().unwrap();
        let element = reference.script_element.unwrap();
        assert_eq!(
            &html[element],
            "<script type=\"text/javascript\" src=\"js/a.js\" defer>\n</script>"
        );
        assert_eq!(reference.kind, ReferenceKind::Attribute);
    }

    #[test]
    fn link_references_have_no_script_element() {
        let reference = scan(r#"<link href="css/a.css" rel="stylesheet">"#)
            .next()
            .unwrap();
        assert!(reference.script_element.is_none());
    }

    #[test]
    fn ignores_srcset_and_unrelated_attributes() {
        assert!(paths(r#"<img srcset="a.png 2x" title="b.png">"#).is_empty());
    }

    #[test]
    fn finds_every_attribute_on_one_element() {
        let html = r#"<img src="img/a.png" data-src="img/b.png" alt="">"#;
        assert_eq!(paths(html), vec!["img/a.png", "img/b.png"]);
    }

    #[test]
    fn finds_url_in_style_attribute_before_other_attributes() {
        let html = r#"<div style="background:url(img/a.png)" data-src="img/b.png"></div>"#;
        assert_eq!(paths(html), vec!["img/a.png", "img/b.png"]);
    }

    #[test]
    fn value_keeps_query_and_fragment() {
        let reference = scan(r#"<script src=" js/a.js?v=3#x "></script>"#).next().unwrap();
        assert_eq!(reference.path, "js/a.js");
        assert_eq!(reference.value, "js/a.js?v=3#x");
    }

    #[test]
    fn script_element_requires_an_owning_script_tag() {
        let html = r#"<img src="img/a.png"></script>"#;
        assert!(scan(html).next().unwrap().script_element.is_none());
    }

    #[test]
    fn scanning_is_restartable() {
        let html = r#"<script src="js/a.js"></script><link href="css/b.css">"#;
        let first: Vec<_> = scan(html).collect();
        let second: Vec<_> = scan(html).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
