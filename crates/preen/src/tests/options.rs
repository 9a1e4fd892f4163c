use super::clean_with;
use crate::*;
use serde_json::json;

#[test]
fn profiles_restrict_the_vocabulary() {
    let input = r#"<svg><circle r="1"></circle></svg><b>x</b>"#;
    assert_eq!(
        clean_with(input, json!({"USE_PROFILES": {"html": true}})),
        "<b>x</b>"
    );
    assert_eq!(
        clean_with(input, json!({"USE_PROFILES": {"svg": true}})),
        r#"<svg><circle r="1"></circle></svg>x"#
    );
}

#[test]
fn explicit_allow_lists_replace_the_defaults() {
    assert_eq!(
        clean_with(
            r#"<b title="t" class="c">x</b><i>y</i>"#,
            json!({"ALLOWED_TAGS": ["b"], "ALLOWED_ATTR": ["title"]})
        ),
        r#"<b title="t">x</b>y"#
    );
}

#[test]
fn locked_config_ignores_call_options() {
    let mut s = Sanitizer::new();
    s.set_config(&SanitizeOptions::from_value(
        json!({"ALLOWED_TAGS": ["b"], "ALLOWED_ATTR": ["title"]}),
    ))
    .unwrap();
    let permissive = SanitizeOptions::from_value(json!({"ALLOWED_TAGS": ["b", "i"]}));
    assert_eq!(
        s.sanitize_with("<i>a</i><b>b</b>", &permissive).unwrap(),
        "a<b>b</b>"
    );
    assert!(!s.is_valid_attribute("b", "class", "x"));
    assert!(s.config().is_some_and(|c| !c.allowed_tags.contains("i")));

    s.clear_config();
    assert_eq!(s.sanitize_str("<i>a</i>").unwrap(), "<i>a</i>");
}

#[test]
fn repeated_options_reuse_the_resolved_config() {
    let mut s = Sanitizer::new();
    let opts = SanitizeOptions::new().with("ADD_TAGS", json!(["x-y"]));
    s.sanitize_with("<b>1</b>", &opts).unwrap();
    let first = s.config().unwrap();
    s.sanitize_with("<b>2</b>", &opts).unwrap();
    assert!(std::rc::Rc::ptr_eq(&first, &s.config().unwrap()));
}

#[test]
fn xhtml_is_case_sensitive() {
    let xhtml = json!({"PARSER_MEDIA_TYPE": "application/xhtml+xml"});
    assert_eq!(clean_with("<myElement>t</myElement>", xhtml.clone()), "t");
    assert_eq!(
        clean_with(
            "<myElement>t</myElement>",
            json!({"PARSER_MEDIA_TYPE": "application/xhtml+xml", "ADD_TAGS": ["myElement"]})
        ),
        "<myElement>t</myElement>"
    );
    assert_eq!(clean_with("<B>x</B><b>y</b>", xhtml), "x<b>y</b>");
}

#[test]
fn whole_document_output() {
    assert_eq!(
        clean_with("<!DOCTYPE html><p>x</p>", json!({"WHOLE_DOCUMENT": true})),
        "<html><head></head><body><p>x</p></body></html>"
    );
    assert_eq!(
        clean_with(
            "<!DOCTYPE html><p>x</p>",
            json!({"WHOLE_DOCUMENT": true, "ADD_TAGS": ["!doctype"]})
        ),
        "<!DOCTYPE html>\n<html><head></head><body><p>x</p></body></html>"
    );
}

#[test]
fn force_body_keeps_leading_head_content() {
    let input = "<style>a{}</style><b>x</b>";
    assert_eq!(clean_with(input, json!({})), "<b>x</b>");
    assert_eq!(
        clean_with(input, json!({"FORCE_BODY": true})),
        "<style>a{}</style><b>x</b>"
    );
}

#[test]
fn leading_whitespace_survives() {
    assert_eq!(clean_with("\n  <b>x</b>", json!({})), "\n  <b>x</b>");
}

#[test]
fn template_contents_are_sanitized() {
    assert_eq!(
        clean_with(
            r#"<p>a</p><template><b onclick="x">t</b><script>s</script></template>"#,
            json!({})
        ),
        "<p>a</p><template><b>t</b></template>"
    );
}
