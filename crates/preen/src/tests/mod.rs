mod clobbering;
mod hook_points;
mod options;
mod sanitize;

use crate::*;
use html5ever::{LocalName, Namespace, QualName};
use serde_json::Value;

fn clean(dirty: &str) -> String {
    Sanitizer::new().sanitize_str(dirty).unwrap()
}

fn clean_with(dirty: &str, options: Value) -> String {
    Sanitizer::new()
        .sanitize_with(dirty, &SanitizeOptions::from_value(options))
        .unwrap()
}

fn element_ns(ns: &str, local: &str) -> Handle {
    dom::new_element(QualName::new(
        None,
        Namespace::from(ns),
        LocalName::from(local),
    ))
}

fn set_attr(node: &Handle, name: &str, value: &str) {
    let name = dom::attribute_qual_name(name, "").unwrap();
    dom::set_attribute(node, name, value, None);
}
