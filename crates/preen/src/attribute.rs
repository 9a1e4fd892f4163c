//! Attribute filtering.

use markup5ever_rcdom::Handle;

use crate::allowlist::document_and_form_properties;
use crate::config::Config;
use crate::dom;
use crate::element::{is_basic_custom_element, is_clobbered};
use crate::error::Result;
use crate::hooks::{AttributeHookEvent, HookPoint};
use crate::patterns::{
    aria_attr_regex, data_attr_regex, script_or_data_regex, scrub_template_expressions,
    strip_attr_whitespace, xml_breakout_attr_regex,
};
use crate::trusted_types;
use crate::walker::Pass;

/// Prefix applied to `id`/`name` values under `SANITIZE_NAMED_PROPS`.
pub const NAMED_PROPS_PREFIX: &str = "user-content-";

/// Whether `value` is acceptable for attribute `lc_name` on tag `lc_tag` (both already case
/// transformed).
pub fn is_valid_attribute(cfg: &Config, lc_tag: &str, lc_name: &str, value: &str) -> bool {
    if cfg.sanitize_dom
        && matches!(lc_name, "id" | "name")
        && document_and_form_properties().contains(value)
    {
        return false;
    }

    if cfg.allow_data_attr && !cfg.forbid_attr.contains(lc_name) && data_attr_regex().is_match(lc_name)
    {
        return true;
    }

    if cfg.allow_aria_attr && aria_attr_regex().is_match(lc_name) {
        return true;
    }

    if !cfg.allowed_attr.contains(lc_name) || cfg.forbid_attr.contains(lc_name) {
        let custom = &cfg.custom_elements;
        let custom_element_attr = is_basic_custom_element(lc_tag)
            && custom.tag_name_ok(lc_tag)
            && custom.attribute_name_ok(lc_name);
        let customized_built_in =
            lc_name == "is" && custom.allow_customized_built_in_elements && custom.tag_name_ok(value);
        return custom_element_attr || customized_built_in;
    }

    if cfg.uri_safe_attr.contains(lc_name) {
        return true;
    }

    let value_no_ws = strip_attr_whitespace(value);
    if cfg.allowed_uri_regexp.is_match(&value_no_ws) {
        return true;
    }

    if matches!(lc_name, "src" | "xlink:href" | "href")
        && lc_tag != "script"
        && value.starts_with("data:")
        && cfg.data_uri_tags.contains(lc_tag)
    {
        return true;
    }

    if cfg.allow_unknown_protocols && !script_or_data_regex().is_match(&value_no_ws) {
        return true;
    }

    value.is_empty()
}

pub(crate) fn sanitize_attributes(pass: &mut Pass<'_>, node: &Handle) -> Result<()> {
    let cfg = pass.cfg;
    pass.hooks
        .run_node(HookPoint::BeforeSanitizeAttributes, node, cfg)?;
    if !dom::is_element(node) || is_clobbered(node) {
        return Ok(());
    }

    let lc_tag = cfg.transform_case(&dom::node_name(node));

    // Reverse order keeps indices of not-yet-visited attributes stable while earlier ones are
    // removed and reinserted.
    let mut index = dom::attribute_count(node);
    while index > 0 {
        index -= 1;
        let Some(attr) = dom::attribute_at(node, index) else {
            continue;
        };
        let name = dom::attr_qualified_name(&attr);
        let lc_name = cfg.transform_case(&name);
        let raw: &str = &attr.value;
        let value = if name == "value" { raw } else { raw.trim() };

        let mut event = AttributeHookEvent {
            attr_name: lc_name.clone(),
            attr_value: value.to_string(),
            keep_attr: true,
            force_keep_attr: false,
            allowed_attributes: &cfg.allowed_attr,
        };
        pass.hooks
            .run_attribute(HookPoint::UponSanitizeAttribute, node, &mut event, cfg)?;
        let AttributeHookEvent {
            attr_value: mut value,
            keep_attr,
            force_keep_attr,
            ..
        } = event;

        if cfg.safe_for_xml && xml_breakout_attr_regex().is_match(&value) {
            pass.remove_attribute(node, &name);
            continue;
        }

        if force_keep_attr {
            continue;
        }

        let logged = pass.remove_attribute(node, &name);

        if !keep_attr {
            continue;
        }

        if !cfg.allow_self_close_in_attr && value.contains("/>") {
            continue;
        }

        if cfg.safe_for_templates {
            value = scrub_template_expressions(&value);
        }

        if !is_valid_attribute(cfg, &lc_tag, &lc_name, &value) {
            continue;
        }

        if cfg.sanitize_named_props && matches!(lc_name.as_str(), "id" | "name") {
            value = format!("{NAMED_PROPS_PREFIX}{value}");
        }

        if attr.name.ns.is_empty() {
            if let Some(ty) = trusted_types::attribute_type(&lc_tag, &lc_name) {
                value = cfg.trusted_types.apply(ty, &value);
            }
        }

        // Names the DOM would refuse stay dropped.
        if !dom::is_valid_attribute_name(&name) {
            continue;
        }
        dom::set_attribute(node, attr.name.clone(), &value, Some(index));

        if is_clobbered(node) {
            pass.force_remove(node);
        } else if logged {
            pass.removed.pop();
        }
    }

    pass.hooks
        .run_node(HookPoint::AfterSanitizeAttributes, node, cfg)?;
    Ok(())
}
