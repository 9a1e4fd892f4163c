use super::{clean, clean_with};
use crate::*;
use serde_json::json;

#[test]
fn scripts_and_handlers_are_removed() {
    assert_eq!(clean("<p>hi<script>alert(1)</script></p>"), "<p>hi</p>");
    assert_eq!(clean("<img src=x onerror=alert(1)>"), r#"<img src="x">"#);
    assert_eq!(
        clean(r#"<a href="javascript:alert(1)">x</a>"#),
        "<a>x</a>"
    );
    assert_eq!(
        clean(r#"<a href=" jav&#x09;ascript:alert(1)">x</a>"#),
        "<a>x</a>"
    );
}

#[test]
fn safe_markup_passes_through() {
    let input = r#"<p class="lead">Hello <a href="https://x.com" title="t">there</a></p><ul><li>one</li></ul>"#;
    assert_eq!(clean(input), input);
}

#[test]
fn unknown_elements_keep_their_content() {
    assert_eq!(clean("<unknown><b>kept</b> text</unknown>"), "<b>kept</b> text");
    assert_eq!(
        clean_with(
            "<div><unknown>gone</unknown>ok</div>",
            json!({"KEEP_CONTENT": false})
        ),
        "<div>ok</div>"
    );
}

#[test]
fn forbid_contents_drops_subtree() {
    assert_eq!(clean("<div><iframe>x</iframe>y</div>"), "<div>y</div>");
    assert_eq!(
        clean_with("<p><b>x</b></p>", json!({"FORBID_TAGS": ["p"], "FORBID_CONTENTS": ["p"]})),
        ""
    );
}

#[test]
fn text_without_markup_is_returned_verbatim() {
    assert_eq!(clean("plain & simple"), "plain & simple");
    assert_eq!(clean(""), "");
}

#[test]
fn loosely_typed_input() {
    let mut s = Sanitizer::new();
    let out = s.sanitize(Dirty::Value(&json!(42)), None).unwrap();
    assert_eq!(out.into_html(), "42");
    let out = s.sanitize(Dirty::Value(&json!(null)), None).unwrap();
    assert_eq!(out.into_html(), "");
    let err = s.sanitize(Dirty::Value(&json!({"a": 1})), None).unwrap_err();
    assert!(matches!(err, Error::NotAString { kind: "object" }));
}

#[test]
fn uri_attributes() {
    assert_eq!(
        clean(r#"<img src="data:image/png;base64,AAAA">"#),
        r#"<img src="data:image/png;base64,AAAA">"#
    );
    assert_eq!(clean(r#"<a href="data:text/html,x">y</a>"#), "<a>y</a>");
    assert_eq!(
        clean(r#"<a href="mailto:a@b.c">m</a>"#),
        r#"<a href="mailto:a@b.c">m</a>"#
    );
    assert_eq!(
        clean_with(
            r#"<a href="https://x.com">y</a>"#,
            json!({"ALLOWED_URI_REGEXP": "^mailto:"})
        ),
        "<a>y</a>"
    );
}

#[test]
fn invalid_uri_pattern_is_a_config_error() {
    let err = Sanitizer::new()
        .sanitize_with(
            "<b>x</b>",
            &SanitizeOptions::from_value(json!({"ALLOWED_URI_REGEXP": "("})),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidPattern {
            option: "ALLOWED_URI_REGEXP",
            ..
        }
    ));
}

#[test]
fn data_and_aria_attributes_follow_their_flags() {
    let input = r#"<div data-x="1" aria-label="l">t</div>"#;
    assert_eq!(clean(input), input);
    assert_eq!(
        clean_with(input, json!({"ALLOW_DATA_ATTR": false, "ALLOW_ARIA_ATTR": false})),
        "<div>t</div>"
    );
}

#[test]
fn add_and_forbid_lists() {
    assert_eq!(
        clean_with("<b foo=\"1\">x</b>", json!({"ADD_ATTR": ["foo"]})),
        r#"<b foo="1">x</b>"#
    );
    assert_eq!(
        clean_with(r#"<b title="t">x</b>"#, json!({"FORBID_ATTR": ["title"]})),
        "<b>x</b>"
    );
    assert_eq!(
        clean_with("<b>x</b><i>y</i>", json!({"FORBID_TAGS": ["b"]})),
        "x<i>y</i>"
    );
}

#[test]
fn self_closing_markup_in_attributes() {
    let input = r#"<b title="a/>b">x</b>"#;
    assert_eq!(clean(input), input);
    assert_eq!(
        clean_with(input, json!({"ALLOW_SELF_CLOSE_IN_ATTR": false})),
        "<b>x</b>"
    );
}

#[test]
fn xml_breakout_in_comments_and_attributes() {
    assert_eq!(clean("<p><!--<img src=x>--></p>"), "<p></p>");
    assert_eq!(clean(r#"<p title="x--&gt;y">z</p>"#), "<p>z</p>");
    assert_eq!(
        clean_with(
            "<p><!--<img src=x>--></p>",
            json!({"SAFE_FOR_XML": false, "ADD_TAGS": ["#comment"]})
        ),
        "<p><!--<img src=x>--></p>"
    );
}

#[test]
fn markup_hidden_in_raw_text_is_dropped() {
    let out = clean(
        r#"<p>a</p><noscript><p title="</noscript><img src=x onerror=alert(1)>"></noscript>"#,
    );
    assert!(out.starts_with("<p>a</p>"));
    assert!(!out.contains("noscript"));
    assert!(!out.contains("onerror"));
}

#[test]
fn safe_for_templates_scrubs_text_and_output() {
    let mut s = Sanitizer::new();
    let opts = SanitizeOptions::from_value(json!({"SAFE_FOR_TEMPLATES": true}));
    assert_eq!(s.sanitize_with("<p>{{ evil }}</p>", &opts).unwrap(), "<p> </p>");
    assert!(
        s.removed()
            .iter()
            .any(|r| matches!(r, Removed::Element { element } if dom::node_name(element) == "#text"))
    );
    assert_eq!(
        s.sanitize_with("<b data-x=\"1\">y</b>", &opts).unwrap(),
        "<b>y</b>"
    );
}

#[test]
fn named_props_are_prefixed() {
    assert_eq!(
        clean_with(
            r#"<div id="foo">x</div><a name="bar">y</a>"#,
            json!({"SANITIZE_NAMED_PROPS": true})
        ),
        r#"<div id="user-content-foo">x</div><a name="user-content-bar">y</a>"#
    );
}

#[test]
fn named_props_still_reject_dom_property_ids() {
    let opts = json!({"SANITIZE_NAMED_PROPS": true});
    assert_eq!(clean_with(r#"<p id="cookie">x</p>"#, opts.clone()), "<p>x</p>");
    assert_eq!(
        clean_with(r#"<form name="submit"><b>y</b></form>"#, opts),
        "<form><b>y</b></form>"
    );
}

#[test]
fn force_kept_ids_skip_the_named_props_prefix() {
    let mut s = Sanitizer::new();
    s.add_hook(
        HookPoint::UponSanitizeAttribute,
        Hook::attribute(|_, event, _| {
            if event.attr_name == "id" {
                event.force_keep_attr = true;
            }
            Ok(())
        }),
    )
    .unwrap();
    let opts = SanitizeOptions::from_value(json!({"SANITIZE_NAMED_PROPS": true}));
    assert_eq!(
        s.sanitize_with(r#"<div id="main" title="t">x</div>"#, &opts)
            .unwrap(),
        r#"<div id="main" title="t">x</div>"#
    );
    assert!(s.removed().is_empty());
}

#[test]
fn dom_property_ids_are_dropped() {
    assert_eq!(clean(r#"<img name="getElementById">"#), "<img>");
    assert_eq!(clean(r#"<p id="cookie">x</p>"#), "<p>x</p>");
    assert_eq!(
        clean_with(r#"<p id="cookie">x</p>"#, json!({"SANITIZE_DOM": false})),
        r#"<p id="cookie">x</p>"#
    );
}

#[test]
fn custom_elements_pass_with_a_tag_check() {
    let opts = json!({"CUSTOM_ELEMENT_HANDLING": {"tagNameCheck": "^x-"}});
    assert_eq!(clean_with("<x-foo>hi</x-foo>", opts.clone()), "<x-foo>hi</x-foo>");
    assert_eq!(clean_with("<y-foo>hi</y-foo>", opts), "hi");
    assert_eq!(clean("<x-foo>hi</x-foo>"), "hi");
}

#[test]
fn attribute_order_is_stable() {
    let input = r#"<a href="/x" title="t" class="c" onclick="y">z</a>"#;
    assert_eq!(clean(input), r#"<a href="/x" title="t" class="c">z</a>"#);
}

#[test]
fn removed_log_records_elements_and_attributes() {
    let mut s = Sanitizer::new();
    s.sanitize_str(r#"<p onclick="x">a<script>s</script></p>"#)
        .unwrap();
    let log: Vec<_> = s.removed().iter().map(Removed::to_json).collect();
    assert_eq!(
        log,
        vec![
            json!({"attribute": {"name": "onclick", "value": "x"}, "from": "p"}),
            json!({"element": "script"}),
        ]
    );

    s.sanitize_str("<b>fine</b>").unwrap();
    assert!(s.removed().is_empty());
}

#[test]
fn free_functions_use_the_thread_default() {
    assert!(!is_valid_attribute("a", "href", "javascript:x").unwrap());
    assert!(is_valid_attribute("A", "HREF", "https://x.com").unwrap());
    assert_eq!(sanitize("<b onclick=x>y</b>").unwrap(), "<b>y</b>");
    assert_eq!(removed().unwrap().len(), 1);
    assert!(!Sanitizer::version().is_empty());
}

#[test]
fn hooks_calling_back_into_the_default_get_an_error() {
    add_hook(
        HookPoint::AfterSanitizeDocument,
        Hook::node(|_, _| {
            let inner = sanitize("<b>x</b>");
            assert!(matches!(inner, Err(Error::DefaultBusy)));
            inner.map(drop).map_err(Into::into)
        }),
    )
    .unwrap();
    let err = sanitize("<i>y</i>").unwrap_err();
    assert!(matches!(
        err,
        Error::Hook {
            point: HookPoint::AfterSanitizeDocument,
            ..
        }
    ));

    remove_all_hooks().unwrap();
    assert_eq!(sanitize("<i>y</i>").unwrap(), "<i>y</i>");
}
