//! Extension points fired during a sanitize call.
//!
//! Hooks are registered per [`HookPoint`] and run synchronously in registration order. Each point
//! accepts one callback shape ([`HookKind`]); registering the wrong shape is rejected up front
//! instead of failing mid-walk.

use markup5ever_rcdom::Handle;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::config::Config;
use crate::error::{Error, HookError, Result};

pub type HookResult = std::result::Result<(), HookError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeforeSanitizeDocument,
    BeforeSanitizeElements,
    UponSanitizeElement,
    AfterSanitizeElements,
    BeforeSanitizeAttributes,
    UponSanitizeAttribute,
    AfterSanitizeAttributes,
    BeforeSanitizeShadowDom,
    UponSanitizeShadowNode,
    AfterSanitizeShadowDom,
    AfterSanitizeDocument,
}

impl HookPoint {
    pub const ALL: [HookPoint; 11] = [
        HookPoint::BeforeSanitizeDocument,
        HookPoint::BeforeSanitizeElements,
        HookPoint::UponSanitizeElement,
        HookPoint::AfterSanitizeElements,
        HookPoint::BeforeSanitizeAttributes,
        HookPoint::UponSanitizeAttribute,
        HookPoint::AfterSanitizeAttributes,
        HookPoint::BeforeSanitizeShadowDom,
        HookPoint::UponSanitizeShadowNode,
        HookPoint::AfterSanitizeShadowDom,
        HookPoint::AfterSanitizeDocument,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HookPoint::BeforeSanitizeDocument => "beforeSanitizeDocument",
            HookPoint::BeforeSanitizeElements => "beforeSanitizeElements",
            HookPoint::UponSanitizeElement => "uponSanitizeElement",
            HookPoint::AfterSanitizeElements => "afterSanitizeElements",
            HookPoint::BeforeSanitizeAttributes => "beforeSanitizeAttributes",
            HookPoint::UponSanitizeAttribute => "uponSanitizeAttribute",
            HookPoint::AfterSanitizeAttributes => "afterSanitizeAttributes",
            HookPoint::BeforeSanitizeShadowDom => "beforeSanitizeShadowDOM",
            HookPoint::UponSanitizeShadowNode => "uponSanitizeShadowNode",
            HookPoint::AfterSanitizeShadowDom => "afterSanitizeShadowDOM",
            HookPoint::AfterSanitizeDocument => "afterSanitizeDocument",
        }
    }

    /// Parses the camelCase entry-point name used by configuration files and the CLI.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn kind(self) -> HookKind {
        match self {
            HookPoint::UponSanitizeElement => HookKind::Element,
            HookPoint::UponSanitizeAttribute => HookKind::Attribute,
            _ => HookKind::Node,
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Node,
    Element,
    Attribute,
}

impl HookKind {
    fn as_str(self) -> &'static str {
        match self {
            HookKind::Node => "node",
            HookKind::Element => "element",
            HookKind::Attribute => "attribute",
        }
    }
}

/// Decision record handed to `uponSanitizeElement`.
///
/// `allowed_tags` is the active allow-list. Setting `allow_tag` overrides its verdict for this
/// node only: `Some(true)` treats the tag as listed, `Some(false)` as unlisted. `FORBID_TAGS`
/// still wins over `Some(true)`.
#[derive(Debug)]
pub struct ElementHookEvent<'a> {
    /// Case-transformed node name (`#text`, `#comment` for character nodes).
    pub tag_name: &'a str,
    pub allowed_tags: &'a HashSet<String>,
    pub allow_tag: Option<bool>,
}

impl ElementHookEvent<'_> {
    /// Whether the tag passes the allow-list after any hook override.
    pub fn is_allowed(&self, forbid_tags: &HashSet<String>) -> bool {
        self.allow_tag
            .unwrap_or_else(|| self.allowed_tags.contains(self.tag_name))
            && !forbid_tags.contains(self.tag_name)
    }
}

/// Decision record handed to `uponSanitizeAttribute`.
///
/// `attr_value` may be rewritten. Setting `keep_attr` to `false` drops the attribute regardless
/// of validity; setting `force_keep_attr` keeps the original attribute and skips every further
/// check.
#[derive(Debug)]
pub struct AttributeHookEvent<'a> {
    pub attr_name: String,
    pub attr_value: String,
    pub keep_attr: bool,
    pub force_keep_attr: bool,
    pub allowed_attributes: &'a HashSet<String>,
}

type NodeFn = dyn Fn(&Handle, &Config) -> HookResult;
type ElementFn = dyn Fn(&Handle, &mut ElementHookEvent<'_>, &Config) -> HookResult;
type AttributeFn = dyn Fn(&Handle, &mut AttributeHookEvent<'_>, &Config) -> HookResult;

#[derive(Clone)]
pub enum Hook {
    Node(Rc<NodeFn>),
    Element(Rc<ElementFn>),
    Attribute(Rc<AttributeFn>),
}

impl Hook {
    pub fn node<F>(f: F) -> Self
    where
        F: Fn(&Handle, &Config) -> HookResult + 'static,
    {
        Hook::Node(Rc::new(f))
    }

    pub fn element<F>(f: F) -> Self
    where
        F: Fn(&Handle, &mut ElementHookEvent<'_>, &Config) -> HookResult + 'static,
    {
        Hook::Element(Rc::new(f))
    }

    pub fn attribute<F>(f: F) -> Self
    where
        F: Fn(&Handle, &mut AttributeHookEvent<'_>, &Config) -> HookResult + 'static,
    {
        Hook::Attribute(Rc::new(f))
    }

    pub fn kind(&self) -> HookKind {
        match self {
            Hook::Node(_) => HookKind::Node,
            Hook::Element(_) => HookKind::Element,
            Hook::Attribute(_) => HookKind::Attribute,
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hook::{:?}", self.kind())
    }
}

#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<HookPoint, Vec<Hook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, point: HookPoint, hook: Hook) -> Result<()> {
        let expected = point.kind();
        if hook.kind() != expected {
            return Err(Error::HookKindMismatch {
                point,
                expected: expected.as_str(),
            });
        }
        self.hooks.entry(point).or_default().push(hook);
        Ok(())
    }

    /// Removes and returns the most recently added hook for `point`.
    pub fn remove(&mut self, point: HookPoint) -> Option<Hook> {
        self.hooks.get_mut(&point).and_then(Vec::pop)
    }

    pub fn remove_all(&mut self, point: HookPoint) {
        self.hooks.remove(&point);
    }

    pub fn clear(&mut self) {
        self.hooks.clear();
    }

    pub fn len(&self, point: HookPoint) -> usize {
        self.hooks.get(&point).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }

    fn for_point(&self, point: HookPoint) -> &[Hook] {
        self.hooks.get(&point).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn run_node(&self, point: HookPoint, node: &Handle, cfg: &Config) -> Result<()> {
        for hook in self.for_point(point) {
            if let Hook::Node(f) = hook {
                f(node, cfg).map_err(|source| Error::Hook { point, source })?;
            }
        }
        Ok(())
    }

    pub(crate) fn run_element(
        &self,
        point: HookPoint,
        node: &Handle,
        event: &mut ElementHookEvent<'_>,
        cfg: &Config,
    ) -> Result<()> {
        for hook in self.for_point(point) {
            if let Hook::Element(f) = hook {
                f(node, &mut *event, cfg).map_err(|source| Error::Hook { point, source })?;
            }
        }
        Ok(())
    }

    pub(crate) fn run_attribute(
        &self,
        point: HookPoint,
        node: &Handle,
        event: &mut AttributeHookEvent<'_>,
        cfg: &Config,
    ) -> Result<()> {
        for hook in self.for_point(point) {
            if let Hook::Attribute(f) = hook {
                f(node, &mut *event, cfg).map_err(|source| Error::Hook { point, source })?;
            }
        }
        Ok(())
    }
}
