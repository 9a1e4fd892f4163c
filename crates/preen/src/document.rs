//! Builds the per-call working tree the walker runs over.

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{LocalName, Namespace, ParseOpts, Prefix, QualName, parse_document};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use crate::allowlist::{HTML_NAMESPACE, XLINK_NAMESPACE, XML_NAMESPACE};
use crate::config::Config;
use crate::dom;
use crate::patterns::leading_whitespace_regex;

/// Marker prepended under `FORCE_BODY` so leading head-only content lands in `<body>`.
pub(crate) const FORCE_BODY_MARKER: &str = "<remove></remove>";

/// Placeholder parsed for empty input and used as the seed document for node import.
pub(crate) const IMPORT_SEED: &str = "<!---->";

pub struct WorkingDocument {
    pub document: Handle,
    /// `<body>`, `<html>` in whole-document mode, or the document element for foreign
    /// namespaces. `None` when the parse produced no body (a frameset document).
    pub root: Option<Handle>,
}

impl WorkingDocument {
    /// Name of the document's doctype, if it has one.
    pub fn doctype_name(&self) -> Option<String> {
        self.document
            .children
            .borrow()
            .iter()
            .find_map(|c| match &c.data {
                NodeData::Doctype { name, .. } => Some(name.to_string()),
                _ => None,
            })
    }
}

pub fn build_working_document(markup: &str, cfg: &Config) -> WorkingDocument {
    let (payload, leading_ws) = if cfg.force_body {
        (format!("{FORCE_BODY_MARKER}{markup}"), None)
    } else {
        let ws = leading_whitespace_regex()
            .find(markup)
            .map(|m| m.as_str().to_string());
        (markup.to_string(), ws)
    };

    let (document, body, html) = if !cfg.is_html_namespace() {
        let wrapped = format!(r#"<template xmlns="{}">{payload}</template>"#, cfg.namespace);
        let (document, element) = parse_xml(&wrapped).unwrap_or_else(|| {
            let element = dom::new_element(QualName::new(
                None,
                Namespace::from(cfg.namespace.as_str()),
                LocalName::from("template"),
            ));
            adopt_html_fragment(&element, &payload);
            let document = dom::new_fragment();
            dom::append_child(&document, &element);
            (document, element)
        });
        (document, Some(element.clone()), Some(element))
    } else if cfg.is_xhtml() {
        let wrapped = format!(
            r#"<html xmlns="{HTML_NAMESPACE}"><head></head><body>{payload}</body></html>"#
        );
        let (document, _) = parse_xml(&wrapped).unwrap_or_else(|| html_skeleton(&payload));
        let body = find_html_element(&document, "body");
        let html = find_html_element(&document, "html");
        (document, body, html)
    } else {
        let parsed = parse_document(RcDom::default(), ParseOpts::default()).one(payload.as_str());
        let document = parsed.document;
        let body = find_html_element(&document, "body");
        let html = find_html_element(&document, "html");
        if let (Some(body), Some(ws)) = (&body, &leading_ws) {
            if !markup.is_empty() {
                dom::insert_child(body, 0, &dom::new_text(ws));
            }
        }
        (document, body, html)
    };

    let root = if cfg.whole_document && cfg.is_html_namespace() {
        html
    } else {
        body
    };
    tracing::trace!(
        bytes = markup.len(),
        xml = cfg.is_xhtml() || !cfg.is_html_namespace(),
        has_root = root.is_some(),
        "built working document"
    );
    WorkingDocument { document, root }
}

/// Deep-copies a caller's node into a fresh working document.
///
/// An imported `<body>` or `<html>` becomes the root itself; anything else is appended to the
/// fresh root. A document container contributes its children.
pub fn import_node(node: &Handle, cfg: &Config) -> WorkingDocument {
    let mut base = build_working_document(IMPORT_SEED, cfg);
    let imported = dom::deep_clone(node);
    let is_root_like = dom::namespace_uri(&imported) == Some(HTML_NAMESPACE)
        && matches!(dom::lc_local_name(&imported).as_str(), "body" | "html");
    if is_root_like {
        base.root = Some(imported);
        return base;
    }
    if let Some(root) = &base.root {
        if matches!(imported.data, NodeData::Document) {
            dom::move_children(&imported, root);
        } else {
            dom::append_child(root, &imported);
        }
    }
    base
}

fn find_html_element(from: &Handle, local: &str) -> Option<Handle> {
    let mut stack: Vec<Handle> = dom::children(from).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if dom::namespace_uri(&node) == Some(HTML_NAMESPACE)
            && dom::qual_name(&node).is_some_and(|n| &*n.local == local)
        {
            return Some(node);
        }
        stack.extend(dom::children(&node).into_iter().rev());
    }
    None
}

/// `<html><head></head><body>` holding `payload` parsed as HTML. Used when XML parsing fails.
fn html_skeleton(payload: &str) -> (Handle, Handle) {
    let document = dom::new_fragment();
    let html = dom::new_html_element("html");
    let body = dom::new_html_element("body");
    dom::append_child(&document, &html);
    dom::append_child(&html, &dom::new_html_element("head"));
    dom::append_child(&html, &body);
    adopt_html_fragment(&body, payload);
    (document, html)
}

fn adopt_html_fragment(target: &Handle, payload: &str) {
    let parsed = parse_document(RcDom::default(), ParseOpts::default()).one(payload);
    if let Some(body) = find_html_element(&parsed.document, "body") {
        dom::move_children(&body, target);
    }
}

/// Parses well-formed XML into an rcdom tree, returning the document and its element.
fn parse_xml(input: &str) -> Option<(Handle, Handle)> {
    let doc = match roxmltree::Document::parse(input) {
        Ok(doc) => doc,
        Err(err) => {
            tracing::debug!(error = %err, "xml parse failed; falling back to html");
            return None;
        }
    };
    let element = convert_xml_tree(doc.root_element())?;
    let document = dom::new_fragment();
    dom::append_child(&document, &element);
    Some((document, element))
}

fn convert_xml_tree(root: roxmltree::Node<'_, '_>) -> Option<Handle> {
    let top = convert_xml_node(root)?;
    let mut pending = vec![(root, top.clone())];
    while let Some((from, to)) = pending.pop() {
        let container = dom::template_contents(&to).unwrap_or_else(|| to.clone());
        for c in from.children() {
            if let Some(child) = convert_xml_node(c) {
                dom::append_child(&container, &child);
                if c.is_element() {
                    pending.push((c, child));
                }
            }
        }
    }
    Some(top)
}

/// Converts one XML node without its children.
fn convert_xml_node(n: roxmltree::Node<'_, '_>) -> Option<Handle> {
    if n.is_element() {
        let tag = n.tag_name();
        let el = dom::new_element(QualName::new(
            None,
            Namespace::from(tag.namespace().unwrap_or("")),
            LocalName::from(tag.name()),
        ));
        for a in n.attributes() {
            let name = xml_attribute_name(&n, a.namespace(), a.name());
            dom::set_attribute(&el, name, a.value(), None);
        }
        return Some(el);
    }
    if n.is_text() {
        return Some(dom::new_text(n.text().unwrap_or_default()));
    }
    if n.is_comment() {
        return Some(dom::new_comment(n.text().unwrap_or_default()));
    }
    n.pi().map(|pi| {
        Node::new(NodeData::ProcessingInstruction {
            target: StrTendril::from_slice(pi.target),
            contents: StrTendril::from_slice(pi.value.unwrap_or_default()),
        })
    })
}

fn xml_attribute_name(owner: &roxmltree::Node<'_, '_>, ns: Option<&str>, local: &str) -> QualName {
    let prefixed = |prefix: &str, uri: &str| {
        QualName::new(
            Some(Prefix::from(prefix)),
            Namespace::from(uri),
            LocalName::from(local),
        )
    };
    match ns {
        Some(XLINK_NAMESPACE) => prefixed("xlink", XLINK_NAMESPACE),
        Some(XML_NAMESPACE) => prefixed("xml", XML_NAMESPACE),
        Some(other) => {
            // The serializer only knows the xml/xlink/xmlns prefixes; keep anything else as a
            // plain qualified name.
            let qualified = match owner.lookup_prefix(other) {
                Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
                _ => local.to_string(),
            };
            QualName::new(None, Namespace::from(""), LocalName::from(qualified.as_str()))
        }
        None => QualName::new(None, Namespace::from(""), LocalName::from(local)),
    }
}
