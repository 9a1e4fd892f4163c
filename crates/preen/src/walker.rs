//! Forward document-order walk over the working tree.
//!
//! Nodes may be removed, spliced or rewritten while the walk is on them, so the successor is
//! computed after each node is processed from where the node used to be. Template contents are
//! walked as nested frames on an explicit stack, so nesting depth never grows the call stack.

use markup5ever_rcdom::Handle;
use std::rc::Rc;

use crate::attribute::sanitize_attributes;
use crate::config::Config;
use crate::dom;
use crate::element::sanitize_element;
use crate::error::Result;
use crate::hooks::{HookPoint, HookRegistry};
use crate::sanitizer::Removed;

pub(crate) struct Pass<'a> {
    pub cfg: &'a Config,
    pub hooks: &'a HookRegistry,
    pub removed: &'a mut Vec<Removed>,
    /// Root of the walk in progress. It is never spliced away.
    pub root: Handle,
    /// Child index of the node being visited, when the walk knows it.
    pub index_hint: Option<usize>,
}

impl Pass<'_> {
    pub fn force_remove(&mut self, node: &Handle) {
        tracing::trace!(node = %dom::node_name(node), "removing node");
        self.removed.push(Removed::Element {
            element: node.clone(),
        });
        dom::detach_near(node, self.index_hint);
    }

    pub fn log_element(&mut self, element: Handle) {
        self.removed.push(Removed::Element { element });
    }

    /// Removes an attribute and logs it. Returns `false` when there was nothing to remove.
    pub fn remove_attribute(&mut self, element: &Handle, name: &str) -> bool {
        let Some((index, attr)) = dom::remove_attribute(element, name) else {
            return false;
        };
        tracing::trace!(attribute = name, element = %dom::node_name(element), "removing attribute");
        self.removed.push(Removed::Attribute {
            name: name.to_string(),
            value: attr.value.to_string(),
            from: element.clone(),
        });
        if name == "is" && !self.cfg.allowed_attr.contains("is") {
            if self.cfg.return_dom {
                self.force_remove(element);
            } else {
                dom::set_attribute(element, attr.name, "", Some(index));
            }
        }
        true
    }
}

/// Where a node sat when its visit began.
struct Visit {
    node: Handle,
    parent: Option<Handle>,
    prev: Option<Handle>,
    index: Option<usize>,
}

impl Visit {
    fn at(node: &Handle, root: &Handle, hint: Option<usize>) -> Self {
        let parent = dom::parent(node);
        let index = if Rc::ptr_eq(node, root) {
            None
        } else {
            dom::index_in_parent_near(node, hint).map(|(_, i)| i)
        };
        let prev = match (&parent, index) {
            (Some(p), Some(i)) if i > 0 => dom::child_at(p, i - 1),
            _ => None,
        };
        Self {
            node: node.clone(),
            parent,
            prev,
            index,
        }
    }
}

/// One tree being walked: the document root or a template's contents.
struct Frame {
    root: Handle,
    shadow: bool,
    next: Option<Handle>,
    /// Child-index hints from `root` down to `next`. A stale hint costs a sibling scan.
    path: Vec<usize>,
    /// Template whose contents are walked in the frame above; its attributes come after.
    suspended: Option<Visit>,
}

impl Frame {
    fn new(root: Handle, next: Option<Handle>, shadow: bool) -> Self {
        let path = match &next {
            Some(n) if !Rc::ptr_eq(n, &root) => vec![0],
            _ => Vec::new(),
        };
        Self {
            root,
            shadow,
            next,
            path,
            suspended: None,
        }
    }
}

/// Walks `pass.root` (itself included) and everything below it.
pub(crate) fn sanitize_tree(pass: &mut Pass<'_>) -> Result<()> {
    let root = pass.root.clone();
    let walked = walk(pass, Frame::new(root.clone(), Some(root.clone()), false));
    pass.root = root;
    pass.index_hint = None;
    walked
}

fn walk(pass: &mut Pass<'_>, top: Frame) -> Result<()> {
    let cfg = pass.cfg;
    let mut frames = vec![top];
    while let Some(frame) = frames.last_mut() {
        pass.root = frame.root.clone();

        if let Some(visit) = frame.suspended.take() {
            pass.index_hint = visit.index;
            sanitize_attributes(pass, &visit.node)?;
            frame.next = successor(&visit, &frame.root, &mut frame.path);
            continue;
        }

        let Some(node) = frame.next.take() else {
            if let Some(done) = frames.pop() {
                if done.shadow {
                    pass.hooks
                        .run_node(HookPoint::AfterSanitizeShadowDom, &done.root, cfg)?;
                }
            }
            continue;
        };

        let visit = Visit::at(&node, &frame.root, frame.path.last().copied());
        pass.index_hint = visit.index;

        if frame.shadow {
            pass.hooks
                .run_node(HookPoint::UponSanitizeShadowNode, &node, cfg)?;
        }

        if !sanitize_element(pass, &node)? {
            if let Some(contents) = dom::template_contents(&node) {
                frame.suspended = Some(visit);
                pass.hooks
                    .run_node(HookPoint::BeforeSanitizeShadowDom, &contents, cfg)?;
                let first = dom::first_child(&contents);
                frames.push(Frame::new(contents, first, true));
                continue;
            }
            sanitize_attributes(pass, &node)?;
        }

        frame.next = successor(&visit, &frame.root, &mut frame.path);
    }
    Ok(())
}

/// Next node to visit after `visit`, given whatever the visit did to the tree. `path` holds the
/// index hints of the visited node and is left holding those of the returned one.
fn successor(visit: &Visit, root: &Handle, path: &mut Vec<usize>) -> Option<Handle> {
    let node = &visit.node;
    let parent_now = dom::parent(node);
    let in_place = match (&visit.parent, &parent_now) {
        (Some(before), Some(now)) => Rc::ptr_eq(before, now),
        (None, None) => true,
        _ => false,
    };
    if in_place || Rc::ptr_eq(node, root) {
        if let Some(child) = dom::first_child(node) {
            path.push(0);
            return Some(child);
        }
        return following(node, root, path);
    }

    let parent = visit.parent.as_ref()?;
    if let Some(prev) = &visit.prev {
        if dom::parent(prev).is_some_and(|pp| Rc::ptr_eq(&pp, parent)) {
            if let (Some(last), Some(index)) = (path.last_mut(), visit.index) {
                *last = index.saturating_sub(1);
            }
            return following(prev, root, path);
        }
    }

    path.pop();
    if let Some(child) = dom::first_child(parent) {
        path.push(0);
        return Some(child);
    }
    following(parent, root, path)
}

/// The node after `node`'s subtree in document order, staying inside `root`.
fn following(node: &Handle, root: &Handle, path: &mut Vec<usize>) -> Option<Handle> {
    let mut cur = node.clone();
    loop {
        if Rc::ptr_eq(&cur, root) {
            return None;
        }
        let (parent, index) = dom::index_in_parent_near(&cur, path.last().copied())?;
        if let Some(next) = dom::child_at(&parent, index + 1) {
            match path.last_mut() {
                Some(last) => *last = index + 1,
                None => path.push(index + 1),
            }
            return Some(next);
        }
        path.pop();
        cur = parent;
    }
}
