//! Per-node removal decisions.

use markup5ever_rcdom::{Handle, NodeData};
use std::rc::Rc;

use crate::allowlist::{self, HTML_NAMESPACE};
use crate::dom;
use crate::error::Result;
use crate::hooks::{ElementHookEvent, HookPoint};
use crate::namespace::is_valid_namespace;
use crate::patterns::{
    comment_tag_like_regex, custom_element_regex, nested_fallback_close_regex,
    scrub_template_expressions, tag_like_regex,
};
use crate::walker::Pass;

/// `true` for names shaped like an autonomous custom element (`x-foo`), except `annotation-xml`.
pub fn is_basic_custom_element(tag: &str) -> bool {
    tag != "annotation-xml" && custom_element_regex().is_match(tag)
}

/// A `<form>` whose named controls would shadow one of the members the walker calls.
///
/// Browsers expose `<input name=x>` as `form.x`, so a control named `attributes` or
/// `removeChild` replaces the real member. Such a form cannot be inspected safely and is
/// dropped whole.
pub fn is_clobbered(node: &Handle) -> bool {
    let is_form = dom::namespace_uri(node) == Some(HTML_NAMESPACE)
        && dom::qual_name(node).is_some_and(|n| &*n.local == "form");
    is_form && has_clobbering_control(node)
}

fn has_clobbering_control(form: &Handle) -> bool {
    let mut stack = dom::children(form);
    while let Some(node) = stack.pop() {
        if !dom::is_element(&node) {
            continue;
        }
        let is_control = dom::namespace_uri(&node) == Some(HTML_NAMESPACE)
            && allowlist::form_named_controls().contains(&dom::lc_local_name(&node));
        let clobbers = is_control
            && ["id", "name"].iter().any(|attr| {
                dom::get_attribute(&node, attr)
                    .is_some_and(|v| allowlist::form_shadowed_members().contains(v.as_str()))
            });
        if clobbers {
            return true;
        }
        stack.extend(dom::children(&node));
    }
    false
}

/// Runs the element checks for one node. Returns `true` when the node was removed.
pub(crate) fn sanitize_element(pass: &mut Pass<'_>, node: &Handle) -> Result<bool> {
    let cfg = pass.cfg;
    pass.hooks
        .run_node(HookPoint::BeforeSanitizeElements, node, cfg)?;

    if is_clobbered(node) {
        pass.force_remove(node);
        return Ok(true);
    }

    let tag_name = cfg.transform_case(&dom::node_name(node));
    let mut event = ElementHookEvent {
        tag_name: &tag_name,
        allowed_tags: &cfg.allowed_tags,
        allow_tag: None,
    };
    pass.hooks
        .run_element(HookPoint::UponSanitizeElement, node, &mut event, cfg)?;
    let tag_allowed = event.is_allowed(&cfg.forbid_tags);

    // Markup hiding inside what the parser produced as plain text is an mXSS signal.
    if dom::has_child_nodes(node)
        && dom::first_element_child(node).is_none()
        && tag_like_regex().is_match(&dom::inner_html(node))
        && tag_like_regex().is_match(&dom::text_content(node))
    {
        pass.force_remove(node);
        return Ok(true);
    }

    match &node.data {
        NodeData::ProcessingInstruction { .. } => {
            pass.force_remove(node);
            return Ok(true);
        }
        NodeData::Comment { contents }
            if cfg.safe_for_xml && comment_tag_like_regex().is_match(contents) =>
        {
            pass.force_remove(node);
            return Ok(true);
        }
        _ => {}
    }

    if !tag_allowed {
        if !cfg.forbid_tags.contains(&tag_name)
            && is_basic_custom_element(&tag_name)
            && cfg.custom_elements.tag_name_ok(&tag_name)
        {
            return Ok(false);
        }
        if cfg.keep_content
            && !cfg.forbid_contents.contains(&tag_name)
            && !Rc::ptr_eq(node, &pass.root)
        {
            dom::hoist_children(node, pass.index_hint);
        }
        pass.force_remove(node);
        return Ok(true);
    }

    if dom::is_element(node) && !is_valid_namespace(node, cfg) {
        pass.force_remove(node);
        return Ok(true);
    }

    if matches!(tag_name.as_str(), "noscript" | "noembed" | "noframes")
        && nested_fallback_close_regex().is_match(&dom::inner_html(node))
    {
        pass.force_remove(node);
        return Ok(true);
    }

    if cfg.safe_for_templates {
        if let Some(content) = dom::text_of(node) {
            let scrubbed = scrub_template_expressions(&content);
            if scrubbed != content {
                pass.log_element(dom::deep_clone(node));
                dom::set_text(node, &scrubbed);
            }
        }
    }

    pass.hooks
        .run_node(HookPoint::AfterSanitizeElements, node, cfg)?;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_element_shape() {
        assert!(is_basic_custom_element("x-foo"));
        assert!(is_basic_custom_element("my-el.v2-b"));
        assert!(!is_basic_custom_element("annotation-xml"));
        assert!(!is_basic_custom_element("div"));
        assert!(!is_basic_custom_element("-x"));
    }

    #[test]
    fn form_with_shadowing_control_is_clobbered() {
        let form = dom::new_html_element("form");
        let input = dom::new_html_element("input");
        let name = dom::attribute_qual_name("name", "").unwrap();
        dom::set_attribute(&input, name.clone(), "attributes", None);
        let fieldset = dom::new_html_element("fieldset");
        dom::append_child(&form, &fieldset);
        dom::append_child(&fieldset, &input);
        assert!(is_clobbered(&form));

        dom::set_attribute(&input, name, "email", None);
        assert!(!is_clobbered(&form));
    }

    #[test]
    fn shadowed_member_names_are_case_sensitive() {
        let form = dom::new_html_element("form");
        let input = dom::new_html_element("input");
        let id = dom::attribute_qual_name("id", "").unwrap();
        dom::set_attribute(&input, id, "nodename", None);
        dom::append_child(&form, &input);
        assert!(!is_clobbered(&form));
    }
}
