use crate::*;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn attribute_hook_can_force_keep() {
    let mut s = Sanitizer::new();
    s.add_hook(
        HookPoint::UponSanitizeAttribute,
        Hook::attribute(|_, event, _| {
            if event.attr_name == "onclick" {
                event.force_keep_attr = true;
            }
            Ok(())
        }),
    )
    .unwrap();
    assert_eq!(
        s.sanitize_str(r#"<b onclick="x" onmouseover="y">z</b>"#).unwrap(),
        r#"<b onclick="x">z</b>"#
    );
}

#[test]
fn attribute_hook_can_drop_or_rewrite() {
    let mut s = Sanitizer::new();
    s.add_hook(
        HookPoint::UponSanitizeAttribute,
        Hook::attribute(|_, event, _| {
            match event.attr_name.as_str() {
                "title" => event.keep_attr = false,
                "href" => event.attr_value = "https://safe.example".to_string(),
                _ => {}
            }
            Ok(())
        }),
    )
    .unwrap();
    assert_eq!(
        s.sanitize_str(r#"<a title="t" href="javascript:x">y</a>"#).unwrap(),
        r#"<a href="https://safe.example">y</a>"#
    );
}

#[test]
fn element_hook_sees_every_node_in_order() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut s = Sanitizer::new();
    s.add_hook(
        HookPoint::UponSanitizeElement,
        Hook::element(move |_, event, _| {
            sink.borrow_mut().push(event.tag_name.to_string());
            Ok(())
        }),
    )
    .unwrap();
    s.sanitize_str("<p><b>x</b></p>").unwrap();
    assert_eq!(*seen.borrow(), ["body", "p", "b", "#text"]);
}

fn tag_override(tag: &'static str, allow: bool) -> Hook {
    Hook::element(move |_, event, _| {
        if event.tag_name == tag {
            event.allow_tag = Some(allow);
        }
        Ok(())
    })
}

#[test]
fn element_hook_can_override_the_allow_list() {
    let mut s = Sanitizer::new();
    s.add_hook(HookPoint::UponSanitizeElement, tag_override("x-note", true))
        .unwrap();
    s.add_hook(HookPoint::UponSanitizeElement, tag_override("b", false))
        .unwrap();
    assert_eq!(
        s.sanitize_str("<x-note>hi</x-note><b>x</b><i>y</i>").unwrap(),
        "<x-note>hi</x-note>x<i>y</i>"
    );
    assert_eq!(s.sanitize_str("<y-note>hi</y-note>").unwrap(), "hi");
}

#[test]
fn forbidden_tags_beat_an_element_hook_override() {
    let mut s = Sanitizer::new();
    s.add_hook(HookPoint::UponSanitizeElement, tag_override("x-note", true))
        .unwrap();
    let opts = SanitizeOptions::from_value(serde_json::json!({"FORBID_TAGS": ["x-note"]}));
    assert_eq!(
        s.sanitize_with("<x-note>hi</x-note>", &opts).unwrap(),
        "hi"
    );
}

#[test]
fn document_hooks_bracket_the_walk() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut s = Sanitizer::new();
    for point in [
        HookPoint::BeforeSanitizeDocument,
        HookPoint::AfterSanitizeDocument,
    ] {
        let sink = calls.clone();
        s.add_hook(
            point,
            Hook::node(move |node, _| {
                sink.borrow_mut()
                    .push(format!("{point}:{}", dom::node_name(node)));
                Ok(())
            }),
        )
        .unwrap();
    }
    s.sanitize_str("<b>x</b>").unwrap();
    assert_eq!(
        *calls.borrow(),
        ["beforeSanitizeDocument:body", "afterSanitizeDocument:body"]
    );
}

#[test]
fn shadow_hooks_cover_template_contents() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut s = Sanitizer::new();
    for point in [
        HookPoint::BeforeSanitizeShadowDom,
        HookPoint::UponSanitizeShadowNode,
        HookPoint::AfterSanitizeShadowDom,
    ] {
        let sink = seen.clone();
        s.add_hook(
            point,
            Hook::node(move |node, _| {
                sink.borrow_mut()
                    .push(format!("{}:{}", point.name(), dom::node_name(node)));
                Ok(())
            }),
        )
        .unwrap();
    }
    s.sanitize_str("<p>a</p><template><b>t</b></template>")
        .unwrap();
    assert_eq!(
        *seen.borrow(),
        [
            "beforeSanitizeShadowDOM:#document",
            "uponSanitizeShadowNode:b",
            "uponSanitizeShadowNode:#text",
            "afterSanitizeShadowDOM:#document",
        ]
    );
}

#[test]
fn hook_errors_abort_the_call() {
    let mut s = Sanitizer::new();
    s.add_hook(
        HookPoint::BeforeSanitizeElements,
        Hook::node(|node, _| {
            if dom::node_name(node) == "i" {
                return Err("no italics".into());
            }
            Ok(())
        }),
    )
    .unwrap();
    let err = s.sanitize_str("<b>x</b><i>y</i>").unwrap_err();
    assert!(matches!(
        err,
        Error::Hook {
            point: HookPoint::BeforeSanitizeElements,
            ..
        }
    ));
    assert_eq!(err.to_string(), "beforeSanitizeElements hook failed: no italics");
}

#[test]
fn hooks_must_match_the_point_kind() {
    let mut s = Sanitizer::new();
    let err = s
        .add_hook(HookPoint::UponSanitizeAttribute, Hook::node(|_, _| Ok(())))
        .unwrap_err();
    assert!(matches!(err, Error::HookKindMismatch { .. }));
    assert!(s.hooks().is_empty());
}

#[test]
fn removing_hooks() {
    let mut s = Sanitizer::new();
    let point = HookPoint::AfterSanitizeAttributes;
    s.add_hook(point, Hook::node(|_, _| Ok(()))).unwrap();
    s.add_hook(point, Hook::node(|_, _| Err("second".into())))
        .unwrap();
    assert_eq!(s.hooks().len(point), 2);

    // The most recent one goes first.
    assert!(s.remove_hook(point).is_some());
    assert_eq!(s.sanitize_str("<b>x</b>").unwrap(), "<b>x</b>");

    s.remove_hooks(point);
    assert!(s.remove_hook(point).is_none());

    s.add_hook(point, Hook::node(|_, _| Ok(()))).unwrap();
    s.remove_all_hooks();
    assert!(s.hooks().is_empty());
}
