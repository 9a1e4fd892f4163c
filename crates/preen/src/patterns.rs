use regex::Regex;
use std::sync::OnceLock;

pub(crate) fn mustache_expr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{[\w\W]*|[\w\W]*\}\}").expect("valid regex"))
}

pub(crate) fn erb_expr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<%[\w\W]*|[\w\W]*%>").expect("valid regex"))
}

pub(crate) fn template_literal_expr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{[\w\W]*").expect("valid regex"))
}

pub(crate) fn data_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^data-[\-\w.\u{00B7}-\u{FFFF}]+$").expect("valid regex"))
}

pub(crate) fn aria_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^aria-[\-\w]+$").expect("valid regex"))
}

/// Default URI-safety pattern: known-safe schemes, scheme-less/relative values, or anything
/// that cannot be parsed as a scheme.
pub fn default_allowed_uri_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:(?:(?:f|ht)tps?|mailto|tel|callto|sms|cid|xmpp|matrix):|[^a-z]|[a-z+.\-]+(?:[^a-z+.\-:]|$))",
        )
        .expect("valid regex")
    })
}

pub(crate) fn script_or_data_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:\w+script|data):").expect("valid regex"))
}

pub(crate) fn attr_whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\u{0000}-\u{0020}\u{00A0}\u{1680}\u{180E}\u{2000}-\u{2029}\u{205F}\u{3000}]")
            .expect("valid regex")
    })
}

pub(crate) fn doctype_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^html$").expect("valid regex"))
}

pub(crate) fn custom_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[a-z][.\w]*(-[.\w]+)+$").expect("valid regex"))
}

pub(crate) fn leading_whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\r\n\t ]+").expect("valid regex"))
}

pub(crate) fn tag_like_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[/\w!]").expect("valid regex"))
}

pub(crate) fn comment_tag_like_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[/\w]").expect("valid regex"))
}

pub(crate) fn nested_fallback_close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</no(script|embed|frames)").expect("valid regex"))
}

/// Attribute values that could close a comment/CDATA section or a raw-text parent when the
/// tree is re-serialized as XML.
pub(crate) fn xml_breakout_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)((--!?|\])>)|</(style|title)").expect("valid regex"))
}

/// Replaces mustache, ERB and template-literal expressions with a single space each.
pub(crate) fn scrub_template_expressions(input: &str) -> String {
    let mut out = mustache_expr_regex().replace_all(input, " ").into_owned();
    out = erb_expr_regex().replace_all(&out, " ").into_owned();
    template_literal_expr_regex().replace_all(&out, " ").into_owned()
}

pub(crate) fn strip_attr_whitespace(value: &str) -> String {
    attr_whitespace_regex().replace_all(value, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uri_regex_accepts_safe_and_relative_values() {
        let re = default_allowed_uri_regex();
        for ok in [
            "https://example.com",
            "http://x",
            "mailto:a@b.c",
            "tel:+123",
            "/relative/path",
            "#frag",
            "?q=1",
            "page.html",
        ] {
            assert!(re.is_match(ok), "{ok}");
        }
        for bad in ["javascript:alert(1)", "JaVaScRiPt:x", "vbscript:msgbox", "data:text/html,x"] {
            assert!(!re.is_match(bad), "{bad}");
        }
    }

    #[test]
    fn scrub_template_expressions_blanks_everything_after_an_opener() {
        assert_eq!(scrub_template_expressions("a {{b}} c"), "  c");
        assert_eq!(scrub_template_expressions("x ${y}"), "x  ");
        assert_eq!(scrub_template_expressions("plain"), "plain");
    }

    #[test]
    fn whitespace_is_stripped_before_uri_checks() {
        assert_eq!(strip_attr_whitespace("java\tscript:\u{00A0}x"), "javascript:x");
    }
}
