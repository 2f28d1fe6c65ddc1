//! Fallback-mode proxy (ghost) rendering
//!
//! When the synthesized pointer fallback is active, a visual clone of the
//! dragged element tracks the pointer. Positioning is always computed as an
//! absolute displacement from the initial tap position, never as an
//! incremental delta, so repeated moves cannot accumulate drift. The
//! displacement is corrected for ancestor scale transforms and for any
//! scrolling of the positioning ancestor since the drag started, and the
//! resulting 2D affine transform is applied in a single step.

use crate::config::{FallbackOffset, SortOptions};
use crate::dom::{NodeId, Tree};
use crate::geometry::{Affine2, Point};

/// Live state of the ghost clone
#[derive(Debug, Clone)]
pub struct GhostState {
    /// The clone tracking the pointer
    pub node: NodeId,
    /// The element being dragged (stays in the list as the placeholder)
    pub source: NodeId,
    /// Positioning ancestor used for scroll-offset compensation
    pub relative_ancestor: NodeId,
    /// Pointer position of the qualifying press
    pub press_origin: Point,
    /// Pointer offset within the source rect at press time (preserves the
    /// visual grab point)
    pub tap_offset: (f64, f64),
    /// Scroll position of the positioning ancestor at drag start
    pub initial_scroll: (f64, f64),
}

/// Clone the dragged element and set up positioning state.
///
/// The clone lands on the tree root when `fallback_on_body` is set,
/// otherwise inside the container. It is marked hidden in the logical
/// tree, so it never participates in hit-testing, layout, or index
/// derivation; the host renders it from [`GhostState`] and the node's
/// transform. Returns `None` when the source has already left the tree.
pub fn create_ghost(
    tree: &mut Tree,
    source: NodeId,
    container: NodeId,
    options: &SortOptions,
    press: Point,
) -> Option<GhostState> {
    let rect = tree.rect(source)?;
    let node = tree.clone_subtree(source)?;
    tree.add_class(node, &options.fallback_class);
    tree.add_class(node, &options.drag_class);
    tree.set_hidden(node, true);

    let parent = if options.fallback_on_body {
        tree.root()
    } else {
        container
    };
    tree.append_child(parent, node);

    let relative_ancestor = tree.positioning_ancestor(container);
    let scroll = tree.scroll(relative_ancestor).unwrap_or_default();

    let ghost = GhostState {
        node,
        source,
        relative_ancestor,
        press_origin: press,
        tap_offset: (press.x - rect.left, press.y - rect.top),
        initial_scroll: (scroll.x, scroll.y),
    };
    tracing::debug!(?ghost.node, ?ghost.relative_ancestor, "ghost created");
    Some(ghost)
}

/// Position the ghost for the current pointer.
///
/// Scale factors are recomputed on every call because ancestors may be
/// animating. The translation is the absolute displacement from the tap
/// origin plus the configured fallback offset, divided by the ancestor
/// scale, plus the scroll that has occurred on the positioning ancestor
/// since drag start.
pub fn position_ghost(
    tree: &mut Tree,
    ghost: &GhostState,
    pointer: Point,
    offset: FallbackOffset,
) {
    let (sx, sy) = ancestor_scale(tree, ghost.relative_ancestor);
    let scroll = tree.scroll(ghost.relative_ancestor).unwrap_or_default();

    let dx = (pointer.x - ghost.press_origin.x + offset.x) / sx
        + (scroll.x - ghost.initial_scroll.0);
    let dy = (pointer.y - ghost.press_origin.y + offset.y) / sy
        + (scroll.y - ghost.initial_scroll.1);

    tree.set_transform(ghost.node, Affine2::translate(dx, dy));
}

/// Remove the ghost node from the tree. Safe if already removed.
pub fn remove_ghost(tree: &mut Tree, ghost: &GhostState) {
    tree.remove(ghost.node);
}

/// Accumulated scale of `node` and its ancestors.
///
/// Per ancestor: decompose its in-flight transform; if that is the
/// identity, try parsing a simple `transform` attribute expression; else
/// treat it as unscaled.
fn ancestor_scale(tree: &Tree, node: NodeId) -> (f64, f64) {
    let mut sx = 1.0;
    let mut sy = 1.0;
    let mut cur = Some(node);
    while let Some(n) = cur {
        let m = tree
            .transform(n)
            .filter(|m| !m.is_identity())
            .or_else(|| tree.attr(n, "transform").and_then(Affine2::parse))
            .unwrap_or(Affine2::IDENTITY);
        let (ax, ay) = m.decompose_scale();
        sx *= ax;
        sy *= ay;
        cur = tree.parent(n);
    }
    (sx, sy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn fixture() -> (Tree, NodeId, NodeId) {
        let mut tree = Tree::new();
        let container = tree.create_node(Rect::new(0.0, 0.0, 100.0, 300.0));
        tree.append_child(tree.root(), container);
        let item = tree.create_node(Rect::new(0.0, 40.0, 100.0, 40.0));
        tree.append_child(container, item);
        (tree, container, item)
    }

    #[test]
    fn test_ghost_absolute_not_cumulative() {
        let (mut tree, container, item) = fixture();
        let options = SortOptions::default();
        let press = Point::new(50.0, 60.0);
        let ghost = create_ghost(&mut tree, item, container, &options, press).unwrap();

        // Many intermediate moves; only the last one matters
        for i in 0..20 {
            position_ghost(
                &mut tree,
                &ghost,
                Point::new(50.0 + i as f64, 60.0 + i as f64 * 3.0),
                FallbackOffset::default(),
            );
        }
        position_ghost(
            &mut tree,
            &ghost,
            Point::new(57.0, 143.0),
            FallbackOffset { x: 2.0, y: -4.0 },
        );

        let (tx, ty) = tree.transform(ghost.node).unwrap().translation();
        assert_eq!((tx, ty), (57.0 - 50.0 + 2.0, 143.0 - 60.0 - 4.0));
    }

    #[test]
    fn test_ghost_scale_compensation() {
        let (mut tree, container, item) = fixture();
        // Container's parent is scaled 2x via a style-like attribute
        tree.set_attr(tree.root(), "transform", "scale(2)");
        let options = SortOptions::default();
        let press = Point::new(10.0, 50.0);
        let ghost = create_ghost(&mut tree, item, container, &options, press).unwrap();

        position_ghost(
            &mut tree,
            &ghost,
            Point::new(30.0, 90.0),
            FallbackOffset::default(),
        );
        let (tx, ty) = tree.transform(ghost.node).unwrap().translation();
        assert_eq!((tx, ty), (10.0, 20.0));
    }

    #[test]
    fn test_ghost_scroll_compensation() {
        let mut tree = Tree::new();
        let scroller = tree.create_node(Rect::new(0.0, 0.0, 100.0, 200.0));
        tree.append_child(tree.root(), scroller);
        tree.set_scroll(
            scroller,
            Some(crate::dom::ScrollState {
                x: 0.0,
                y: 10.0,
                max_x: 0.0,
                max_y: 100.0,
            }),
        );
        let container = tree.create_node(Rect::new(0.0, 0.0, 100.0, 300.0));
        tree.append_child(scroller, container);
        let item = tree.create_node(Rect::new(0.0, 0.0, 100.0, 40.0));
        tree.append_child(container, item);

        let options = SortOptions::default();
        let press = Point::new(10.0, 10.0);
        let ghost = create_ghost(&mut tree, item, container, &options, press).unwrap();

        // Ancestor scrolls 30px further down during the drag
        tree.scroll_by(scroller, 0.0, 30.0);
        position_ghost(&mut tree, &ghost, press, FallbackOffset::default());

        let (tx, ty) = tree.transform(ghost.node).unwrap().translation();
        assert_eq!((tx, ty), (0.0, 30.0));
    }

    #[test]
    fn test_ghost_lands_on_root_with_fallback_on_body() {
        let (mut tree, container, item) = fixture();
        let options = SortOptions {
            fallback_on_body: true,
            ..SortOptions::default()
        };
        let ghost =
            create_ghost(&mut tree, item, container, &options, Point::new(0.0, 40.0)).unwrap();
        assert_eq!(tree.parent(ghost.node), Some(tree.root()));
        assert!(tree.has_class(ghost.node, &options.fallback_class));

        remove_ghost(&mut tree, &ghost);
        assert!(!tree.is_attached(ghost.node));
        // Second removal is a no-op
        remove_ghost(&mut tree, &ghost);
    }
}
