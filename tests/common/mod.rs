//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::time::Duration;

use dragsort::{
    InputMsg, LayoutDriver, NodeId, Point, Rect, Selector, SortEvent, SortOptions, Sortable, Tree,
};

pub const ITEM_HEIGHT: f64 = 40.0;
pub const ITEM_WIDTH: f64 = 100.0;

/// Stacks visible children top-to-bottom inside the container
pub struct VerticalStack;

impl LayoutDriver for VerticalStack {
    fn relayout(&mut self, tree: &mut Tree, container: NodeId) {
        let Some(area) = tree.rect(container) else {
            return;
        };
        let children: Vec<NodeId> = tree.children(container).to_vec();
        let mut top = area.top;
        for child in children {
            if tree.is_hidden(child) {
                continue;
            }
            let r = tree.rect(child).unwrap_or_default();
            tree.set_rect(child, Rect::new(area.left, top, r.width, r.height));
            top += r.height;
        }
    }
}

/// Stacks visible children left-to-right inside the container
pub struct HorizontalStack;

impl LayoutDriver for HorizontalStack {
    fn relayout(&mut self, tree: &mut Tree, container: NodeId) {
        let Some(area) = tree.rect(container) else {
            return;
        };
        let children: Vec<NodeId> = tree.children(container).to_vec();
        let mut left = area.left;
        for child in children {
            if tree.is_hidden(child) {
                continue;
            }
            let r = tree.rect(child).unwrap_or_default();
            tree.set_rect(child, Rect::new(left, area.top, r.width, r.height));
            left += r.width;
        }
    }
}

/// One engine over one vertical list, ready to receive input
pub struct Fixture {
    pub tree: Tree,
    pub layout: VerticalStack,
    pub engine: Sortable,
    pub container: NodeId,
    pub items: Vec<NodeId>,
}

/// Build a vertical list of `n` 40px items at the tree origin
pub fn vertical_fixture(n: usize, options: SortOptions) -> Fixture {
    let mut tree = Tree::new();
    let container = tree.create_node(Rect::new(0.0, 0.0, ITEM_WIDTH, n as f64 * ITEM_HEIGHT));
    let root = tree.root();
    tree.append_child(root, container);

    let mut items = Vec::new();
    for i in 0..n {
        let item = tree.create_node(Rect::new(
            0.0,
            i as f64 * ITEM_HEIGHT,
            ITEM_WIDTH,
            ITEM_HEIGHT,
        ));
        tree.append_child(container, item);
        items.push(item);
    }

    let mut engine = Sortable::new();
    engine.register_container(container, options);

    Fixture {
        tree,
        layout: VerticalStack,
        engine,
        container,
        items,
    }
}

impl Fixture {
    pub fn handle(&mut self, msg: InputMsg) -> bool {
        self.engine.handle(&mut self.tree, &mut self.layout, msg)
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.engine
            .advance(&mut self.tree, &mut self.layout, Duration::from_millis(ms));
    }

    /// Press, move in steps (spaced past the reorder throttle), release
    pub fn drag(&mut self, from: Point, to: Point, steps: usize) {
        self.handle(InputMsg::mouse_down(from.x, from.y));
        for i in 1..=steps {
            let t = i as f64 / steps as f64;
            self.advance_ms(17);
            self.handle(InputMsg::moved(
                from.x + (to.x - from.x) * t,
                from.y + (to.y - from.y) * t,
            ));
        }
        self.handle(InputMsg::up(to.x, to.y));
    }

    /// Current visible order of the container's children
    pub fn order(&self) -> Vec<NodeId> {
        self.tree.children_matching(self.container, &Selector::Any)
    }

    pub fn events(&mut self) -> Vec<SortEvent> {
        self.engine.take_events()
    }

    /// Center point of the item currently at `index`
    pub fn item_center(&self, index: usize) -> Point {
        let rect = self.tree.rect(self.order()[index]).unwrap();
        Point::new(rect.left + rect.width / 2.0, rect.top + rect.height / 2.0)
    }

    /// Let every pending animation run to completion
    pub fn settle(&mut self) {
        self.advance_ms(1000);
    }
}

/// Positions of the lifecycle events we care about, for order assertions
pub fn event_names(events: &[SortEvent]) -> Vec<&'static str> {
    events
        .iter()
        .map(|e| match e {
            SortEvent::Choose { .. } => "choose",
            SortEvent::Start { .. } => "start",
            SortEvent::Update { .. } => "update",
            SortEvent::Add { .. } => "add",
            SortEvent::Remove { .. } => "remove",
            SortEvent::End { .. } => "end",
            SortEvent::Filter { .. } => "filter",
            SortEvent::AnimationStart { .. } => "anim_start",
            SortEvent::AnimationEnd { .. } => "anim_end",
            SortEvent::AnimationCancel { .. } => "anim_cancel",
        })
        .collect()
}

/// The lifecycle names with animation noise stripped
pub fn lifecycle_names(events: &[SortEvent]) -> Vec<&'static str> {
    event_names(events)
        .into_iter()
        .filter(|n| !n.starts_with("anim_"))
        .collect()
}
