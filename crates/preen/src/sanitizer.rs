use markup5ever_rcdom::Handle;
use serde_json::{Value, json};
use std::fmt;
use std::rc::Rc;

use crate::attribute;
use crate::config::{Config, SanitizeOptions};
use crate::document::{WorkingDocument, build_working_document, import_node};
use crate::dom;
use crate::error::{Error, Result};
use crate::hooks::{Hook, HookPoint, HookRegistry};
use crate::patterns::{doctype_name_regex, scrub_template_expressions};
use crate::trusted_types::TrustedHtml;
use crate::walker::{Pass, sanitize_tree};

/// Stand-in parsed for empty input; the walk removes it, so the output is empty.
const EMPTY_INPUT_PLACEHOLDER: &str = "<!-->";

/// Input to [`Sanitizer::sanitize`].
#[derive(Clone)]
pub enum Dirty<'a> {
    Markup(&'a str),
    /// Loosely typed input: strings pass through, scalars use their string form, `null` is
    /// empty, arrays and objects are rejected.
    Value(&'a Value),
    Node(Handle),
}

impl<'a> From<&'a str> for Dirty<'a> {
    fn from(s: &'a str) -> Self {
        Dirty::Markup(s)
    }
}

impl From<Handle> for Dirty<'_> {
    fn from(h: Handle) -> Self {
        Dirty::Node(h)
    }
}

#[derive(Clone)]
pub enum Sanitized {
    Html(String),
    Trusted(TrustedHtml),
    /// The sanitized root (or the caller's own node under `IN_PLACE`).
    Node(Handle),
    /// A parentless container holding the sanitized root's children.
    Fragment(Handle),
}

impl Sanitized {
    /// Markup for any output shape. Node outputs are serialized from a copy.
    pub fn into_html(self) -> String {
        match self {
            Sanitized::Html(s) => s,
            Sanitized::Trusted(t) => t.into_string(),
            Sanitized::Node(h) => {
                let copy = dom::deep_clone(&h);
                dom::flatten_template_contents(&copy);
                dom::outer_html(&copy)
            }
            Sanitized::Fragment(h) => {
                let copy = dom::deep_clone(&h);
                dom::flatten_template_contents(&copy);
                dom::inner_html(&copy)
            }
        }
    }

    pub fn as_node(&self) -> Option<&Handle> {
        match self {
            Sanitized::Node(h) | Sanitized::Fragment(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Debug for Sanitized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sanitized::Html(s) => f.debug_tuple("Html").field(s).finish(),
            Sanitized::Trusted(t) => f.debug_tuple("Trusted").field(t).finish(),
            Sanitized::Node(h) => f.debug_tuple("Node").field(&dom::node_name(h)).finish(),
            Sanitized::Fragment(h) => f
                .debug_tuple("Fragment")
                .field(&dom::children(h).len())
                .finish(),
        }
    }
}

/// One entry of the removal log.
#[derive(Clone)]
pub enum Removed {
    Element { element: Handle },
    Attribute {
        name: String,
        value: String,
        from: Handle,
    },
}

impl Removed {
    pub fn to_json(&self) -> Value {
        match self {
            Removed::Element { element } => json!({ "element": dom::node_name(element) }),
            Removed::Attribute { name, value, from } => json!({
                "attribute": { "name": name, "value": value },
                "from": dom::node_name(from),
            }),
        }
    }
}

impl fmt::Debug for Removed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Removed::Element { element } => f
                .debug_struct("Element")
                .field("element", &dom::node_name(element))
                .finish(),
            Removed::Attribute { name, value, from } => f
                .debug_struct("Attribute")
                .field("name", name)
                .field("value", value)
                .field("from", &dom::node_name(from))
                .finish(),
        }
    }
}

/// A sanitizer engine: configuration, hooks and the last call's removal log.
///
/// Engines are cheap to create and independent of each other. They are not `Send`; create one
/// per thread (or use the thread-local default through the crate-level functions).
#[derive(Debug, Default)]
pub struct Sanitizer {
    hooks: HookRegistry,
    removed: Vec<Removed>,
    cached: Option<(SanitizeOptions, Rc<Config>)>,
    locked: Option<Rc<Config>>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Always `true`: the DOM implementation is linked in.
    pub fn is_supported(&self) -> bool {
        true
    }

    /// Resolves options, reusing the previous configuration when the options are unchanged.
    pub fn resolve_config(&mut self, options: &SanitizeOptions) -> Result<Rc<Config>> {
        if let Some((cached_options, cfg)) = &self.cached {
            if cached_options == options {
                return Ok(cfg.clone());
            }
        }
        let cfg = Rc::new(Config::resolve(options)?);
        self.cached = Some((options.clone(), cfg.clone()));
        Ok(cfg)
    }

    /// Locks a configuration; per-call options are ignored until [`Self::clear_config`].
    pub fn set_config(&mut self, options: &SanitizeOptions) -> Result<()> {
        let cfg = self.resolve_config(options)?;
        self.locked = Some(cfg);
        Ok(())
    }

    pub fn clear_config(&mut self) {
        self.locked = None;
        self.cached = None;
    }

    /// The locked configuration, or the one used most recently.
    pub fn config(&self) -> Option<Rc<Config>> {
        self.locked
            .clone()
            .or_else(|| self.cached.as_ref().map(|(_, cfg)| cfg.clone()))
    }

    pub fn is_valid_attribute(&mut self, tag: &str, attr: &str, value: &str) -> bool {
        let cfg = match self.config() {
            Some(cfg) => cfg,
            None => match self.resolve_config(&SanitizeOptions::default()) {
                Ok(cfg) => cfg,
                Err(_) => return false,
            },
        };
        let lc_tag = cfg.transform_case(tag);
        let lc_attr = cfg.transform_case(attr);
        attribute::is_valid_attribute(&cfg, &lc_tag, &lc_attr, value)
    }

    pub fn add_hook(&mut self, point: HookPoint, hook: Hook) -> Result<()> {
        self.hooks.add(point, hook)
    }

    pub fn remove_hook(&mut self, point: HookPoint) -> Option<Hook> {
        self.hooks.remove(point)
    }

    pub fn remove_hooks(&mut self, point: HookPoint) {
        self.hooks.remove_all(point);
    }

    pub fn remove_all_hooks(&mut self) {
        self.hooks.clear();
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Elements and attributes removed by the most recent call.
    pub fn removed(&self) -> &[Removed] {
        &self.removed
    }

    pub fn sanitize_str(&mut self, dirty: &str) -> Result<String> {
        Ok(self.sanitize(Dirty::Markup(dirty), None)?.into_html())
    }

    pub fn sanitize_with(&mut self, dirty: &str, options: &SanitizeOptions) -> Result<String> {
        Ok(self.sanitize(Dirty::Markup(dirty), Some(options))?.into_html())
    }

    pub fn sanitize(
        &mut self,
        dirty: Dirty<'_>,
        options: Option<&SanitizeOptions>,
    ) -> Result<Sanitized> {
        let input = match dirty {
            Dirty::Markup(s) => Input::Markup(s.to_string()),
            Dirty::Value(v) => Input::Markup(value_to_markup(v)?),
            Dirty::Node(h) => Input::Node(h),
        };
        let input = match input {
            Input::Markup(s) if s.is_empty() => Input::Markup(EMPTY_INPUT_PLACEHOLDER.to_string()),
            other => other,
        };

        let cfg = match &self.locked {
            Some(cfg) => cfg.clone(),
            None => {
                let defaults = SanitizeOptions::default();
                self.resolve_config(options.unwrap_or(&defaults))?
            }
        };
        self.removed.clear();

        let (doc, in_place) = match input {
            Input::Node(node) if cfg.in_place => {
                let tag = cfg.transform_case(&dom::node_name(&node));
                if !cfg.tag_allowed(&tag) {
                    return Err(Error::ForbiddenInPlaceRoot { tag });
                }
                (None, Some(node))
            }
            Input::Node(node) => (Some(import_node(&node, &cfg)), None),
            Input::Markup(markup) => {
                if !cfg.return_dom
                    && !cfg.safe_for_templates
                    && !cfg.whole_document
                    && !cfg.force_body
                    && !markup.contains('<')
                {
                    return Ok(self.wrap_html(&cfg, markup));
                }
                (Some(build_working_document(&markup, &cfg)), None)
            }
        };

        let root = match (&doc, &in_place) {
            (_, Some(node)) => node.clone(),
            (Some(WorkingDocument { root: Some(root), .. }), None) => root.clone(),
            _ => {
                tracing::debug!("parse produced no body; returning empty output");
                return Ok(if cfg.return_dom {
                    Sanitized::Fragment(dom::new_fragment())
                } else {
                    self.wrap_html(&cfg, String::new())
                });
            }
        };

        {
            let mut pass = Pass {
                cfg: &cfg,
                hooks: &self.hooks,
                removed: &mut self.removed,
                root: root.clone(),
                index_hint: None,
            };
            if cfg.force_body && in_place.is_none() && doc.is_some() {
                if let Some(marker) = dom::first_child(&root) {
                    pass.force_remove(&marker);
                }
            }
            pass.hooks
                .run_node(HookPoint::BeforeSanitizeDocument, &root, &cfg)?;
            sanitize_tree(&mut pass)?;
            pass.hooks
                .run_node(HookPoint::AfterSanitizeDocument, &root, &cfg)?;
        }
        tracing::debug!(removed = self.removed.len(), "sanitize pass complete");

        if let Some(node) = in_place {
            return Ok(Sanitized::Node(node));
        }

        if cfg.return_dom {
            if cfg.return_dom_fragment {
                let fragment = dom::new_fragment();
                dom::move_children(&root, &fragment);
                return Ok(Sanitized::Fragment(fragment));
            }
            return Ok(Sanitized::Node(root));
        }

        dom::flatten_template_contents(&root);
        let mut html = if cfg.whole_document {
            dom::outer_html(&root)
        } else {
            dom::inner_html(&root)
        };

        if cfg.whole_document && cfg.allowed_tags.contains("!doctype") {
            if let Some(name) = doc.as_ref().and_then(WorkingDocument::doctype_name) {
                if doctype_name_regex().is_match(&name) {
                    html = format!("<!DOCTYPE {name}>\n{html}");
                }
            }
        }

        if cfg.safe_for_templates {
            html = scrub_template_expressions(&html);
        }

        Ok(self.wrap_html(&cfg, html))
    }

    fn wrap_html(&self, cfg: &Config, html: String) -> Sanitized {
        if cfg.return_trusted_type {
            Sanitized::Trusted(cfg.trusted_types.create_html(&html))
        } else {
            Sanitized::Html(html)
        }
    }
}

enum Input {
    Markup(String),
    Node(Handle),
}

fn value_to_markup(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) => return Err(Error::NotAString { kind: "array" }),
        Value::Object(_) => return Err(Error::NotAString { kind: "object" }),
    })
}
