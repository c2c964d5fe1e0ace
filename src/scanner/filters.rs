use regex::Regex;

fn remote_reference_patterns() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*:").expect("invalid scheme regex"),
                Regex::new(r"^//").expect("invalid protocol-relative regex"),
                Regex::new(r"^#").expect("invalid fragment regex"),
                Regex::new(r"\{\{|<%|\$\{").expect("invalid template marker regex"),
            ]
        })
        .as_slice()
}

/// Determine whether a scanned value should be left alone rather than offered to the rules.
///
/// Anything carrying a scheme (`http:`, `data:`, `mailto:`), protocol-relative URLs, bare
/// fragments and values still containing template markers cannot name a local file.
pub fn should_skip_reference(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || remote_reference_patterns()
            .iter()
            .any(|pattern| pattern.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::should_skip_reference;

    #[test]
    fn skips_remote_urls() {
        assert!(should_skip_reference("https://example.com/app.js"));
        assert!(should_skip_reference("HTTP://example.com"));
        assert!(should_skip_reference("//ajax.googleapis.com/angular.js"));
    }

    #[test]
    fn skips_data_and_mailto_uris() {
        assert!(should_skip_reference("data:image/png;base64,abc"));
        assert!(should_skip_reference("mailto:user@example.com"));
    }

    #[test]
    fn skips_fragments_blanks_and_templates() {
        assert!(should_skip_reference("#top"));
        assert!(should_skip_reference("   "));
        assert!(should_skip_reference("{{ asset }}/app.js"));
        assert!(should_skip_reference("<%= base %>/app.js"));
    }

    #[test]
    fn keeps_relative_and_root_relative_paths() {
        assert!(!should_skip_reference("js/app.js"));
        assert!(!should_skip_reference("/css/main.css"));
        assert!(!should_skip_reference("../img/logo.png"));
    }
}
