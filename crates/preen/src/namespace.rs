use markup5ever_rcdom::Handle;

use crate::allowlist::{self, HTML_NAMESPACE, MATHML_NAMESPACE, SVG_NAMESPACE};
use crate::config::Config;
use crate::dom;

/// Decides whether an element may appear in its namespace given its parent.
///
/// A missing or non-element parent is treated as a `template` element in the configured
/// namespace.
pub fn is_valid_namespace(element: &Handle, cfg: &Config) -> bool {
    let Some(name) = dom::qual_name(element) else {
        return false;
    };
    let parent = dom::parent(element).filter(dom::is_element);
    let (parent_ns, parent_tag) = match parent.as_ref().and_then(dom::qual_name) {
        Some(p) => (p.ns.to_string(), dom::qualified(p).to_ascii_lowercase()),
        None => (cfg.namespace.clone(), "template".to_string()),
    };
    let ns: &str = &name.ns;
    let tag = dom::qualified(name).to_ascii_lowercase();

    if !cfg.allowed_namespaces.contains(ns) {
        return false;
    }

    match ns {
        SVG_NAMESPACE => match parent_ns.as_str() {
            HTML_NAMESPACE => tag == "svg",
            MATHML_NAMESPACE => {
                tag == "svg"
                    && (parent_tag == "annotation-xml"
                        || cfg.mathml_text_integration_points.contains(&parent_tag))
            }
            _ => allowlist::all_svg_tags().contains(&tag),
        },
        MATHML_NAMESPACE => match parent_ns.as_str() {
            HTML_NAMESPACE => tag == "math",
            SVG_NAMESPACE => tag == "math" && cfg.html_integration_points.contains(&parent_tag),
            _ => allowlist::all_mathml_tags().contains(&tag),
        },
        HTML_NAMESPACE => {
            if parent_ns == SVG_NAMESPACE && !cfg.html_integration_points.contains(&parent_tag) {
                return false;
            }
            if parent_ns == MATHML_NAMESPACE
                && !cfg.mathml_text_integration_points.contains(&parent_tag)
            {
                return false;
            }
            !allowlist::all_mathml_tags().contains(&tag)
                && (allowlist::common_svg_and_html_elements().contains(&tag)
                    || !allowlist::all_svg_tags().contains(&tag))
        }
        // Any other allowed namespace is only reachable through the XML parser.
        _ => cfg.is_xhtml(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SanitizeOptions;
    use html5ever::{LocalName, Namespace, QualName};

    fn el(ns: &str, local: &str) -> Handle {
        dom::new_element(QualName::new(None, Namespace::from(ns), LocalName::from(local)))
    }

    fn defaults() -> Config {
        Config::resolve(&SanitizeOptions::new()).unwrap()
    }

    #[test]
    fn svg_enters_html_only_through_the_svg_root() {
        let cfg = defaults();
        let div = el(HTML_NAMESPACE, "div");
        let svg = el(SVG_NAMESPACE, "svg");
        let path = el(SVG_NAMESPACE, "path");
        dom::append_child(&div, &svg);
        assert!(is_valid_namespace(&svg, &cfg));

        dom::append_child(&div, &path);
        assert!(!is_valid_namespace(&path, &cfg));

        dom::append_child(&svg, &path);
        assert!(is_valid_namespace(&path, &cfg));
    }

    #[test]
    fn html_inside_svg_needs_an_integration_point() {
        let cfg = defaults();
        let svg = el(SVG_NAMESPACE, "svg");
        let p = el(HTML_NAMESPACE, "p");
        dom::append_child(&svg, &p);
        assert!(!is_valid_namespace(&p, &cfg));

        let fo = el(SVG_NAMESPACE, "foreignObject");
        dom::append_child(&svg, &fo);
        dom::append_child(&fo, &p);
        assert!(is_valid_namespace(&p, &cfg));
    }

    #[test]
    fn html_elements_may_not_reuse_foreign_names() {
        let cfg = defaults();
        assert!(!is_valid_namespace(&el(HTML_NAMESPACE, "mi"), &cfg));
        assert!(!is_valid_namespace(&el(HTML_NAMESPACE, "circle"), &cfg));
        assert!(is_valid_namespace(&el(HTML_NAMESPACE, "style"), &cfg));
    }

    #[test]
    fn mathml_roots_and_unknown_namespaces() {
        let cfg = defaults();
        let math = el(MATHML_NAMESPACE, "math");
        assert!(is_valid_namespace(&math, &cfg));
        let mrow = el(MATHML_NAMESPACE, "mrow");
        assert!(!is_valid_namespace(&mrow, &cfg));
        assert!(!is_valid_namespace(&el("urn:custom", "thing"), &cfg));
    }
}
