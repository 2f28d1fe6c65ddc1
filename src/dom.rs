//! Retained element tree the engine operates on
//!
//! The original target of this engine is a browser-style DOM; in a headless
//! Rust crate the host supplies an explicit tree instead. `Tree` is an
//! id-keyed arena of nodes carrying the measured rect, classes, attributes,
//! scroll state, and in-flight transform the drag controller needs. The
//! host is responsible for keeping rects in sync with its real layout via
//! the [`LayoutDriver`] seam.
//!
//! Every lookup returns `Option`; a stale or detached id silently yields
//! `None` rather than panicking.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::geometry::{Affine2, Axis, Point, Rect};

/// Index of a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

/// Scroll state of a scroll-container node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    pub x: f64,
    pub y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ScrollState {
    /// Remaining scroll room in the given direction (+1 or -1) per axis
    pub fn can_scroll_x(&self, dir: f64) -> bool {
        (dir > 0.0 && self.x < self.max_x) || (dir < 0.0 && self.x > 0.0)
    }

    pub fn can_scroll_y(&self, dir: f64) -> bool {
        (dir > 0.0 && self.y < self.max_y) || (dir < 0.0 && self.y > 0.0)
    }
}

/// One element in the tree
#[derive(Debug, Clone, Default)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub rect: Rect,
    classes: BTreeSet<String>,
    attrs: BTreeMap<String, String>,
    pub hidden: bool,
    /// In-flight visual transform (set by the animation engine / ghost)
    pub transform: Affine2,
    /// Declared layout axis (flex-direction analog), if any
    pub layout_axis: Option<Axis>,
    /// Present on scroll containers
    pub scroll: Option<ScrollState>,
    detached: bool,
}

/// The element tree: an arena of nodes under a single root
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree containing only the root node
    pub fn new() -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.nodes.push(Node::default());
        tree
    }

    /// The root node (the "body" analog)
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Create a detached node with the given rect
    pub fn create_node(&mut self, rect: Rect) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            rect,
            detached: true,
            ..Node::default()
        });
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Whether the node is connected to the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        if id == self.root() {
            return true;
        }
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            if p == self.root() {
                return true;
            }
            cur = p;
        }
        false
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|&c| c != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
            n.detached = true;
        }
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() || parent == child {
            return;
        }
        self.detach(child);
        if let Some(n) = self.node_mut(child) {
            n.parent = Some(parent);
            n.detached = false;
        }
        if let Some(p) = self.node_mut(parent) {
            p.children.push(child);
        }
    }

    /// Insert `child` immediately before `reference` among `parent`'s children.
    /// Falls back to appending when the reference is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.insert_at_reference(parent, child, reference, 0);
    }

    /// Insert `child` immediately after `reference` among `parent`'s children
    pub fn insert_after(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.insert_at_reference(parent, child, reference, 1);
    }

    fn insert_at_reference(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
        offset: usize,
    ) {
        if self.node(parent).is_none() || self.node(child).is_none() || parent == child {
            return;
        }
        self.detach(child);
        if let Some(n) = self.node_mut(child) {
            n.parent = Some(parent);
            n.detached = false;
        }
        let Some(p) = self.node_mut(parent) else {
            return;
        };
        match p.children.iter().position(|&c| c == reference) {
            Some(idx) => p.children.insert(idx + offset, child),
            None => p.children.push(child),
        }
    }

    /// Detach a node (and implicitly its subtree) from the tree
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root() {
            return;
        }
        self.detach(id);
    }

    /// Deep-copy a subtree; the copy is detached
    pub fn clone_subtree(&mut self, id: NodeId) -> Option<NodeId> {
        let src = self.node(id)?.clone();
        let children = src.children.clone();
        let copy = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            detached: true,
            ..src
        });
        for child in children {
            if let Some(c) = self.clone_subtree(child) {
                self.append_child(copy, c);
            }
        }
        Some(copy)
    }

    // ========================================================================
    // Node data
    // ========================================================================

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.node(id).map(|n| n.rect)
    }

    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(n) = self.node_mut(id) {
            n.rect = rect;
        }
    }

    /// The node's rect as currently rendered: layout rect shifted by the
    /// translation of its in-flight transform.
    pub fn visual_rect(&self, id: NodeId) -> Option<Rect> {
        let n = self.node(id)?;
        let (tx, ty) = n.transform.translation();
        Some(n.rect.translated(tx, ty))
    }

    pub fn transform(&self, id: NodeId) -> Option<Affine2> {
        self.node(id).map(|n| n.transform)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Affine2) {
        if let Some(n) = self.node_mut(id) {
            n.transform = transform;
        }
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(n) = self.node_mut(id) {
            n.classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(n) = self.node_mut(id) {
            n.classes.remove(class);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).map(|n| n.classes.contains(class)).unwrap_or(false)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(n) = self.node_mut(id) {
            n.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?.attrs.get(name).map(String::as_str)
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.hidden).unwrap_or(true)
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(n) = self.node_mut(id) {
            n.hidden = hidden;
        }
    }

    pub fn set_layout_axis(&mut self, id: NodeId, axis: Option<Axis>) {
        if let Some(n) = self.node_mut(id) {
            n.layout_axis = axis;
        }
    }

    pub fn layout_axis(&self, id: NodeId) -> Option<Axis> {
        self.node(id)?.layout_axis
    }

    pub fn scroll(&self, id: NodeId) -> Option<ScrollState> {
        self.node(id)?.scroll
    }

    pub fn set_scroll(&mut self, id: NodeId, scroll: Option<ScrollState>) {
        if let Some(n) = self.node_mut(id) {
            n.scroll = scroll;
        }
    }

    /// Scroll a container by (dx, dy), clamped to its scroll range
    pub fn scroll_by(&mut self, id: NodeId, dx: f64, dy: f64) {
        if let Some(n) = self.node_mut(id) {
            if let Some(s) = &mut n.scroll {
                s.x = (s.x + dx).clamp(0.0, s.max_x);
                s.y = (s.y + dy).clamp(0.0, s.max_y);
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Direct children of `parent` matching `selector`, in tree order.
    ///
    /// Hidden children are not part of the visible order and are skipped;
    /// this is what keeps the fallback ghost out of index derivation.
    pub fn children_matching(&self, parent: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|&c| !self.is_hidden(c) && selector.matches(self, c))
            .collect()
    }

    /// Index of `child` among `parent`'s children matching `selector`.
    ///
    /// The index is always derived from live tree position, never cached.
    pub fn index_of_matching(
        &self,
        parent: NodeId,
        child: NodeId,
        selector: &Selector,
    ) -> Option<usize> {
        self.children_matching(parent, selector)
            .iter()
            .position(|&c| c == child)
    }

    /// Top-most visible element under the point, or `None`.
    ///
    /// Later siblings paint above earlier ones; hidden subtrees are skipped.
    /// Hit-testing uses visual rects so mid-animation elements are found
    /// where they are rendered.
    pub fn element_from_point(&self, p: Point) -> Option<NodeId> {
        self.hit(self.root(), p)
    }

    fn hit(&self, id: NodeId, p: Point) -> Option<NodeId> {
        if self.is_hidden(id) {
            return None;
        }
        // Paint order: last child on top
        for &child in self.children(id).iter().rev() {
            if let Some(hit) = self.hit(child, p) {
                return Some(hit);
            }
        }
        let contains = if id == self.root() {
            true
        } else {
            self.visual_rect(id).map(|r| r.contains(p)).unwrap_or(false)
        };
        if contains {
            Some(id)
        } else {
            None
        }
    }

    /// Nearest ancestor (including `id` itself) matching `selector`,
    /// stopping at `boundary` (exclusive).
    pub fn closest(&self, id: NodeId, selector: &Selector, boundary: NodeId) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == boundary {
                return None;
            }
            if selector.matches(self, n) {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }

    /// Scroll-container ancestors of `id`, nearest first
    pub fn scrollable_ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            if self.scroll(n).is_some() {
                out.push(n);
            }
            cur = self.parent(n);
        }
        out
    }

    /// Nearest ancestor that acts as a positioning context for the ghost:
    /// the first scroll container above `id`, else the root.
    pub fn positioning_ancestor(&self, id: NodeId) -> NodeId {
        self.scrollable_ancestors(id)
            .first()
            .copied()
            .unwrap_or_else(|| self.root())
    }
}

// ============================================================================
// Selectors
// ============================================================================

/// A minimal selector for the `draggable` / `handle` / `filter` options.
///
/// Supported forms: `"> *"` (any direct child), `".class"`, `"[attr]"`,
/// `"[attr=value]"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    /// Matches every node (the `"> *"` default)
    Any,
    Class(String),
    Attr { name: String, value: Option<String> },
}

impl Default for Selector {
    fn default() -> Self {
        Selector::Any
    }
}

impl Selector {
    pub fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        match self {
            Selector::Any => true,
            Selector::Class(c) => tree.has_class(id, c),
            Selector::Attr { name, value } => match (tree.attr(id, name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            },
        }
    }
}

impl TryFrom<String> for Selector {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let s = s.trim();
        if s.is_empty() || s == "> *" || s == "*" {
            return Ok(Selector::Any);
        }
        if let Some(class) = s.strip_prefix('.') {
            if class.is_empty() {
                return Err(format!("empty class selector: {s:?}"));
            }
            return Ok(Selector::Class(class.to_string()));
        }
        if let Some(inner) = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return match inner.split_once('=') {
                Some((name, value)) => Ok(Selector::Attr {
                    name: name.trim().to_string(),
                    value: Some(value.trim().to_string()),
                }),
                None => Ok(Selector::Attr {
                    name: inner.trim().to_string(),
                    value: None,
                }),
            };
        }
        Err(format!("unsupported selector: {s:?}"))
    }
}

impl From<Selector> for String {
    fn from(s: Selector) -> String {
        match s {
            Selector::Any => "> *".to_string(),
            Selector::Class(c) => format!(".{c}"),
            Selector::Attr { name, value: None } => format!("[{name}]"),
            Selector::Attr {
                name,
                value: Some(v),
            } => format!("[{name}={v}]"),
        }
    }
}

impl std::str::FromStr for Selector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::try_from(s.to_string())
    }
}

// ============================================================================
// Layout seam
// ============================================================================

/// Measurement collaborator: recomputes child rects after the controller
/// mutates the order of a container's children. The engine never lays out
/// anything itself; it only reads the rects the driver wrote.
pub trait LayoutDriver {
    fn relayout(&mut self, tree: &mut Tree, container: NodeId);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_selector() -> Selector {
        "*".parse().unwrap()
    }

    fn build_list(tree: &mut Tree) -> (NodeId, Vec<NodeId>) {
        let container = tree.create_node(Rect::new(0.0, 0.0, 100.0, 300.0));
        tree.append_child(tree.root(), container);
        let mut items = Vec::new();
        for i in 0..3 {
            let item = tree.create_node(Rect::new(0.0, i as f64 * 40.0, 100.0, 40.0));
            tree.append_child(container, item);
            items.push(item);
        }
        (container, items)
    }

    #[test]
    fn test_insert_before_reorders() {
        let mut tree = Tree::new();
        let (container, items) = build_list(&mut tree);
        tree.insert_before(container, items[2], items[0]);
        assert_eq!(tree.children(container), &[items[2], items[0], items[1]]);
    }

    #[test]
    fn test_insert_after_reorders() {
        let mut tree = Tree::new();
        let (container, items) = build_list(&mut tree);
        tree.insert_after(container, items[0], items[2]);
        assert_eq!(tree.children(container), &[items[1], items[2], items[0]]);
    }

    #[test]
    fn test_children_matching_skips_hidden() {
        let mut tree = Tree::new();
        let (container, items) = build_list(&mut tree);
        tree.set_hidden(items[1], true);
        assert_eq!(
            tree.children_matching(container, &item_selector()),
            vec![items[0], items[2]]
        );
    }

    #[test]
    fn test_index_always_derived_from_live_position() {
        let mut tree = Tree::new();
        let (container, items) = build_list(&mut tree);
        let sel = item_selector();
        assert_eq!(tree.index_of_matching(container, items[0], &sel), Some(0));
        tree.insert_after(container, items[0], items[2]);
        assert_eq!(tree.index_of_matching(container, items[0], &sel), Some(2));
    }

    #[test]
    fn test_element_from_point_topmost() {
        let mut tree = Tree::new();
        let (_, items) = build_list(&mut tree);
        assert_eq!(
            tree.element_from_point(Point::new(50.0, 60.0)),
            Some(items[1])
        );
    }

    #[test]
    fn test_element_from_point_skips_hidden() {
        let mut tree = Tree::new();
        let (_, items) = build_list(&mut tree);
        tree.set_hidden(items[1], true);
        // The container itself is behind the item
        let hit = tree.element_from_point(Point::new(50.0, 60.0));
        assert_ne!(hit, Some(items[1]));
    }

    #[test]
    fn test_element_from_point_uses_visual_rect() {
        let mut tree = Tree::new();
        let (_, items) = build_list(&mut tree);
        // Slide the first item down over the second
        tree.set_transform(items[0], Affine2::translate(0.0, 45.0));
        assert_eq!(
            tree.element_from_point(Point::new(50.0, 50.0)),
            Some(items[0])
        );
    }

    #[test]
    fn test_closest_stops_at_boundary() {
        let mut tree = Tree::new();
        let (container, items) = build_list(&mut tree);
        tree.add_class(items[1], "item");
        let sel: Selector = ".item".parse().unwrap();
        assert_eq!(tree.closest(items[1], &sel, tree.root()), Some(items[1]));
        assert_eq!(tree.closest(items[0], &sel, container), None);
    }

    #[test]
    fn test_scroll_by_clamps() {
        let mut tree = Tree::new();
        let id = tree.create_node(Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.append_child(tree.root(), id);
        tree.set_scroll(
            id,
            Some(ScrollState {
                x: 0.0,
                y: 10.0,
                max_x: 0.0,
                max_y: 50.0,
            }),
        );
        tree.scroll_by(id, 0.0, 100.0);
        assert_eq!(tree.scroll(id).unwrap().y, 50.0);
        tree.scroll_by(id, 0.0, -100.0);
        assert_eq!(tree.scroll(id).unwrap().y, 0.0);
    }

    #[test]
    fn test_clone_subtree_detached_copy() {
        let mut tree = Tree::new();
        let (container, items) = build_list(&mut tree);
        tree.add_class(items[0], "item");
        let copy = tree.clone_subtree(items[0]).unwrap();
        assert!(tree.has_class(copy, "item"));
        assert!(!tree.is_attached(copy));
        assert_eq!(tree.children(container).len(), 3);
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("> *".parse::<Selector>().unwrap(), Selector::Any);
        assert_eq!(
            ".card".parse::<Selector>().unwrap(),
            Selector::Class("card".into())
        );
        assert_eq!(
            "[data-id=7]".parse::<Selector>().unwrap(),
            Selector::Attr {
                name: "data-id".into(),
                value: Some("7".into())
            }
        );
        assert!("div > span".parse::<Selector>().is_err());
    }
}
