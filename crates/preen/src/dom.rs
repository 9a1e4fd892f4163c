//! Thin tree-manipulation layer over `markup5ever_rcdom`.
//!
//! The rcdom tree is a plain `Rc` graph: children live in a `RefCell<Vec<Handle>>` and parents
//! are weak links. Everything here keeps both directions consistent, and never holds a
//! `RefCell` borrow across a call that could re-enter user code.

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, Prefix, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::RefCell;
use std::rc::Rc;

use crate::allowlist::{HTML_NAMESPACE, XLINK_NAMESPACE, XML_NAMESPACE, XMLNS_NAMESPACE};

pub fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

pub fn index_in_parent(node: &Handle) -> Option<(Handle, usize)> {
    index_in_parent_near(node, None)
}

/// Like [`index_in_parent`], checking `hint` before scanning the sibling list.
pub fn index_in_parent_near(node: &Handle, hint: Option<usize>) -> Option<(Handle, usize)> {
    let parent = parent(node)?;
    let idx = {
        let children = parent.children.borrow();
        match hint.filter(|&i| children.get(i).is_some_and(|c| Rc::ptr_eq(c, node))) {
            Some(i) => i,
            None => children.iter().position(|c| Rc::ptr_eq(c, node))?,
        }
    };
    Some((parent, idx))
}

pub fn detach(node: &Handle) {
    detach_near(node, None);
}

/// Detaches `node`, trying `hint` as its child index first.
pub fn detach_near(node: &Handle, hint: Option<usize>) {
    if let Some((parent, idx)) = index_in_parent_near(node, hint) {
        parent.children.borrow_mut().remove(idx);
    }
    node.parent.set(None);
}

pub fn append_child(parent: &Handle, child: &Handle) {
    detach(child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

pub fn insert_child(parent: &Handle, index: usize, child: &Handle) {
    detach(child);
    child.parent.set(Some(Rc::downgrade(parent)));
    let mut children = parent.children.borrow_mut();
    let index = index.min(children.len());
    children.insert(index, child.clone());
}

pub fn first_child(node: &Handle) -> Option<Handle> {
    node.children.borrow().first().cloned()
}

pub fn child_at(node: &Handle, index: usize) -> Option<Handle> {
    node.children.borrow().get(index).cloned()
}

pub fn children(node: &Handle) -> Vec<Handle> {
    node.children.borrow().clone()
}

pub fn has_child_nodes(node: &Handle) -> bool {
    !node.children.borrow().is_empty()
}

pub fn first_element_child(node: &Handle) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|c| is_element(c))
        .cloned()
}

/// Appends every child of `from` to `to`, keeping their order.
pub fn move_children(from: &Handle, to: &Handle) {
    let moved = std::mem::take(&mut *from.children.borrow_mut());
    for child in &moved {
        child.parent.set(Some(Rc::downgrade(to)));
    }
    to.children.borrow_mut().extend(moved);
}

/// Moves `node`'s children to just after it, keeping their order. `hint` is tried as `node`'s
/// child index before scanning.
pub fn hoist_children(node: &Handle, hint: Option<usize>) {
    let Some((parent, idx)) = index_in_parent_near(node, hint) else {
        return;
    };
    let moved = std::mem::take(&mut *node.children.borrow_mut());
    for child in &moved {
        child.parent.set(Some(Rc::downgrade(&parent)));
    }
    parent
        .children
        .borrow_mut()
        .splice(idx + 1..idx + 1, moved);
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

pub fn qual_name(node: &Handle) -> Option<&QualName> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name),
        _ => None,
    }
}

pub fn namespace_uri(node: &Handle) -> Option<&str> {
    qual_name(node).map(|n| &*n.ns)
}

/// Local name, lowercased. Empty for non-elements.
pub fn lc_local_name(node: &Handle) -> String {
    qual_name(node)
        .map(|n| n.local.to_ascii_lowercase().to_string())
        .unwrap_or_default()
}

/// DOM `nodeName`: the qualified element name or a `#`-prefixed pseudo name.
pub fn node_name(node: &Handle) -> String {
    match &node.data {
        NodeData::Element { name, .. } => qualified(name),
        NodeData::Text { .. } => "#text".to_string(),
        NodeData::Comment { .. } => "#comment".to_string(),
        NodeData::Document => "#document".to_string(),
        NodeData::Doctype { name, .. } => name.to_string(),
        NodeData::ProcessingInstruction { target, .. } => target.to_string(),
    }
}

pub fn qualified(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

pub fn attr_qualified_name(attr: &Attribute) -> String {
    qualified(&attr.name)
}

pub fn attribute_count(node: &Handle) -> usize {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs.borrow().len(),
        _ => 0,
    }
}

pub fn attribute_at(node: &Handle, index: usize) -> Option<Attribute> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs.borrow().get(index).cloned(),
        _ => None,
    }
}

/// Looks up an attribute by qualified name (ASCII case-insensitive for the HTML namespace).
pub fn get_attribute(node: &Handle, name: &str) -> Option<String> {
    let NodeData::Element { attrs, name: el, .. } = &node.data else {
        return None;
    };
    let fold = &*el.ns == HTML_NAMESPACE;
    attrs
        .borrow()
        .iter()
        .find(|a| names_match(&attr_qualified_name(a), name, fold))
        .map(|a| a.value.to_string())
}

/// Removes the first attribute with this qualified name, returning it and its former index.
pub fn remove_attribute(node: &Handle, name: &str) -> Option<(usize, Attribute)> {
    let NodeData::Element { attrs, name: el, .. } = &node.data else {
        return None;
    };
    let fold = &*el.ns == HTML_NAMESPACE;
    let mut attrs = attrs.borrow_mut();
    let idx = attrs
        .iter()
        .position(|a| names_match(&attr_qualified_name(a), name, fold))?;
    Some((idx, attrs.remove(idx)))
}

/// Sets an attribute, replacing an existing one in place or inserting at `index` (appending
/// when `None`).
pub fn set_attribute(node: &Handle, name: QualName, value: &str, index: Option<usize>) -> bool {
    let NodeData::Element { attrs, .. } = &node.data else {
        return false;
    };
    let mut attrs = attrs.borrow_mut();
    let value = StrTendril::from_slice(value);
    if let Some(existing) = attrs.iter_mut().find(|a| a.name == name) {
        existing.value = value;
        return true;
    }
    let attr = Attribute { name, value };
    match index {
        Some(i) => {
            let i = i.min(attrs.len());
            attrs.insert(i, attr);
        }
        None => attrs.push(attr),
    }
    true
}

fn names_match(a: &str, b: &str, fold: bool) -> bool {
    if fold { a.eq_ignore_ascii_case(b) } else { a == b }
}

/// Builds an attribute name the way `setAttributeNS`/`setAttribute` would, or `None` when the
/// name is not a valid XML name.
pub fn attribute_qual_name(qualified: &str, namespace: &str) -> Option<QualName> {
    if !is_valid_attribute_name(qualified) {
        return None;
    }
    match qualified.split_once(':') {
        Some((prefix, local)) if !namespace.is_empty() => {
            let expected = match prefix {
                "xlink" => XLINK_NAMESPACE,
                "xml" => XML_NAMESPACE,
                "xmlns" => XMLNS_NAMESPACE,
                _ => namespace,
            };
            if expected != namespace {
                return None;
            }
            Some(QualName::new(
                Some(Prefix::from(prefix)),
                Namespace::from(namespace),
                LocalName::from(local),
            ))
        }
        _ => Some(QualName::new(
            None,
            Namespace::from(""),
            LocalName::from(qualified),
        )),
    }
}

/// Mirrors the name check `setAttribute` performs before accepting a name.
pub fn is_valid_attribute_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with(':') || name.ends_with(':') {
        return false;
    }
    !name.chars().any(|c| {
        c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
    })
}

pub fn text_of(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

pub fn set_text(node: &Handle, text: &str) {
    if let NodeData::Text { contents } = &node.data {
        *contents.borrow_mut() = StrTendril::from_slice(text);
    }
}

/// DOM `textContent`: text/comment data for character nodes, concatenated descendant text for
/// elements and fragments.
pub fn text_content(node: &Handle) -> String {
    match &node.data {
        NodeData::Text { contents } => contents.borrow().to_string(),
        NodeData::Comment { contents } => contents.to_string(),
        NodeData::ProcessingInstruction { contents, .. } => contents.to_string(),
        NodeData::Doctype { .. } => String::new(),
        NodeData::Element { .. } | NodeData::Document => {
            let mut out = String::new();
            collect_text(node, &mut out);
            out
        }
    }
}

fn collect_text(node: &Handle, out: &mut String) {
    let mut stack: Vec<Handle> = children(node).into_iter().rev().collect();
    while let Some(next) = stack.pop() {
        match &next.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } => stack.extend(children(&next).into_iter().rev()),
            _ => {}
        }
    }
}

pub fn template_contents(node: &Handle) -> Option<Handle> {
    match &node.data {
        NodeData::Element {
            template_contents, ..
        } => template_contents.borrow().clone(),
        _ => None,
    }
}

pub fn new_element(name: QualName) -> Handle {
    let is_template = &*name.ns == HTML_NAMESPACE && &*name.local == "template";
    Node::new(NodeData::Element {
        name,
        attrs: RefCell::new(Vec::new()),
        template_contents: RefCell::new(is_template.then(new_fragment)),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn new_html_element(local: &str) -> Handle {
    new_element(QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from(local),
    ))
}

pub fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

pub fn new_comment(text: &str) -> Handle {
    Node::new(NodeData::Comment {
        contents: StrTendril::from_slice(text),
    })
}

/// A parentless container standing in for a `DocumentFragment`.
pub fn new_fragment() -> Handle {
    Node::new(NodeData::Document)
}

/// Deep copy of a subtree (including template contents), detached from any parent.
pub fn deep_clone(node: &Handle) -> Handle {
    let copy = shallow_clone(node);
    let mut pending = vec![(node.clone(), copy.clone())];
    while let Some((from, to)) = pending.pop() {
        if let (Some(src), Some(dst)) = (template_contents(&from), template_contents(&to)) {
            pending.push((src, dst));
        }
        for child in children(&from) {
            let child_copy = shallow_clone(&child);
            append_child(&to, &child_copy);
            pending.push((child, child_copy));
        }
    }
    copy
}

/// Copies a node without its children. Template contents become an empty fragment.
fn shallow_clone(node: &Handle) -> Handle {
    let data = match &node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::ProcessingInstruction { target, contents } => {
            NodeData::ProcessingInstruction {
                target: target.clone(),
                contents: contents.clone(),
            }
        }
        NodeData::Element {
            name,
            attrs,
            template_contents,
            mathml_annotation_xml_integration_point,
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(
                template_contents.borrow().as_ref().map(|_| new_fragment()),
            ),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        },
    };
    Node::new(data)
}

/// Moves template contents back into the element's child list so the serializer emits them.
pub fn flatten_template_contents(node: &Handle) {
    let mut stack = vec![node.clone()];
    while let Some(next) = stack.pop() {
        if let Some(contents) = template_contents(&next) {
            move_children(&contents, &next);
        }
        stack.extend(children(&next));
    }
}

pub fn inner_html(node: &Handle) -> String {
    serialize_with(node, TraversalScope::ChildrenOnly(None))
}

pub fn outer_html(node: &Handle) -> String {
    if matches!(node.data, NodeData::Document) {
        return inner_html(node);
    }
    serialize_with(node, TraversalScope::IncludeNode)
}

fn serialize_with(node: &Handle, scope: TraversalScope) -> String {
    let mut buf = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: scope,
        ..Default::default()
    };
    let handle: SerializableHandle = node.clone().into();
    if let Err(err) = serialize(&mut buf, &handle, opts) {
        tracing::warn!(error = %err, "serialization into memory buffer failed");
    }
    String::from_utf8_lossy(&buf).into_owned()
}
