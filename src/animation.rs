//! FLIP animation engine
//!
//! Reorder mutations snap elements to new layout positions instantly; this
//! module makes the change legible by the First/Last/Invert/Play technique:
//! capture rects before the mutation, compare with the rects after, then
//! hold each moved element at its old position via an inverse-delta
//! transform and let it travel to rest. Completion is a scheduled task, so
//! the host renderer only ever reads `Tree` transforms and interpolates
//! them toward identity.
//!
//! Interrupting an animation with a mutation along the same line of travel
//! re-times the new leg from the progress the element had conceptually
//! made, so rapid back-and-forth swaps do not stack full-length animations.

use std::time::Duration;

use crate::dom::{NodeId, Selector, Tree};
use crate::events::{EventDispatcher, SortEvent};
use crate::geometry::{Affine2, Rect};
use crate::scheduler::{Scheduler, TaskHandle, TaskKind};

/// Distances below this are treated as zero when re-timing
const DISTANCE_EPSILON: f64 = 1e-3;

/// One element currently traveling to its new layout position
#[derive(Debug, Clone)]
pub struct AnimationRecord {
    pub node: NodeId,
    /// Position this leg started from (conceptually; the transform holds
    /// the element here)
    pub from: Rect,
    /// Layout position this leg travels to
    pub to: Rect,
    pub started: Duration,
    pub duration: Duration,
    /// Easing hint for the host renderer's interpolation
    pub easing: Option<String>,
    task: TaskHandle,
}

impl AnimationRecord {
    /// Fraction of this leg already elapsed at `now`, in [0, 1]
    fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (now.saturating_sub(self.started).as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Where along the leg the element conceptually is at `now`
    fn position_at(&self, now: Duration) -> Rect {
        let p = self.progress(now);
        self.from.translated(
            (self.to.left - self.from.left) * p,
            (self.to.top - self.from.top) * p,
        )
    }
}

/// Rects captured immediately before a reorder mutation
#[derive(Debug, Default)]
pub struct CapturedLayout {
    entries: Vec<(NodeId, Rect)>,
}

impl CapturedLayout {
    /// Snapshot the visual rects of `container`'s matching children.
    ///
    /// Hidden elements (the fallback ghost among them) are excluded by the
    /// matching itself. Visual rects include in-flight transforms, so
    /// capturing mid-animation sees elements where they are rendered, not
    /// where layout put them.
    pub fn capture(tree: &Tree, container: NodeId, selector: &Selector) -> Self {
        let mut entries = Vec::new();
        for child in tree.children_matching(container, selector) {
            if let Some(rect) = tree.visual_rect(child) {
                entries.push((child, rect));
            }
        }
        Self { entries }
    }
}

/// All in-flight animations of one engine
#[derive(Debug, Default)]
pub struct AnimationState {
    records: Vec<AnimationRecord>,
}

impl AnimationState {
    pub fn is_animating(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn record(&self, node: NodeId) -> Option<&AnimationRecord> {
        self.records.iter().find(|r| r.node == node)
    }

    /// Compare a pre-mutation snapshot against current layout and start a
    /// leg for every element whose position changed.
    ///
    /// A zero duration disables animation entirely; elements simply appear
    /// at their new positions.
    pub fn play(
        &mut self,
        tree: &mut Tree,
        scheduler: &mut Scheduler,
        events: &mut EventDispatcher,
        captured: CapturedLayout,
        duration_ms: u64,
        easing: Option<&str>,
    ) {
        if duration_ms == 0 {
            return;
        }
        let base = Duration::from_millis(duration_ms);
        let now = scheduler.now();

        for (node, captured_rect) in captured.entries {
            let Some(to) = tree.rect(node) else {
                continue;
            };
            let prev = self.take_record(node, scheduler);

            // For an element interrupted mid-leg the starting point is its
            // conceptual in-flight position, not the held visual rect.
            let from = match &prev {
                Some(p) => p.position_at(now),
                None => captured_rect,
            };

            if from.same_position(&to) {
                // Already at rest (or reversed before it conceptually left)
                tree.set_transform(node, Affine2::IDENTITY);
                continue;
            }

            let duration = match &prev {
                // Pure mid-flight reversal: travel back for as long as the
                // outbound leg actually ran
                Some(p) if to.same_position(&p.from) && collinear(p.from, p.to, from) => {
                    let d = base.mul_f64(p.progress(now));
                    if d.as_secs_f64() * 1000.0 <= DISTANCE_EPSILON {
                        base
                    } else {
                        d
                    }
                }
                _ => base,
            };

            // Hold the element at its starting position; travel is the host
            // renderer's interpolation toward the identity transform.
            tree.set_transform(
                node,
                Affine2::translate(from.left - to.left, from.top - to.top),
            );
            let task = scheduler.schedule_once(TaskKind::AnimationDone(node), duration);
            self.records.push(AnimationRecord {
                node,
                from,
                to,
                started: now,
                duration,
                easing: easing.map(str::to_string),
                task,
            });
            events.emit(SortEvent::AnimationStart {
                item: node,
                easing: easing.map(str::to_string),
            });
        }
    }

    /// A [`TaskKind::AnimationDone`] task fired: settle the element
    pub fn on_done(&mut self, tree: &mut Tree, events: &mut EventDispatcher, node: NodeId) {
        let Some(idx) = self.records.iter().position(|r| r.node == node) else {
            return;
        };
        self.records.swap_remove(idx);
        tree.set_transform(node, Affine2::IDENTITY);
        events.emit(SortEvent::AnimationEnd { item: node });
    }

    /// Abort every in-flight animation, snapping elements to their layout
    /// positions
    pub fn cancel_all(
        &mut self,
        tree: &mut Tree,
        scheduler: &mut Scheduler,
        events: &mut EventDispatcher,
    ) {
        for record in self.records.drain(..) {
            scheduler.cancel(record.task);
            tree.set_transform(record.node, Affine2::IDENTITY);
            events.emit(SortEvent::AnimationCancel { item: record.node });
        }
    }

    fn take_record(&mut self, node: NodeId, scheduler: &mut Scheduler) -> Option<AnimationRecord> {
        let idx = self.records.iter().position(|r| r.node == node)?;
        let record = self.records.swap_remove(idx);
        scheduler.cancel(record.task);
        Some(record)
    }
}

fn distance(a: Rect, b: Rect) -> f64 {
    let dx = a.left - b.left;
    let dy = a.top - b.top;
    (dx * dx + dy * dy).sqrt()
}

/// Whether `c` lies on the line through `a` and `b` (by rect origin)
fn collinear(a: Rect, b: Rect, c: Rect) -> bool {
    let cross = (b.left - a.left) * (c.top - a.top) - (b.top - a.top) * (c.left - a.left);
    cross.abs() <= DISTANCE_EPSILON * distance(a, b).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn fixture() -> (Tree, NodeId, Vec<NodeId>) {
        let mut tree = Tree::new();
        let container = tree.create_node(Rect::new(0.0, 0.0, 100.0, 300.0));
        tree.append_child(tree.root(), container);
        let mut items = Vec::new();
        for i in 0..3 {
            let item = tree.create_node(Rect::new(0.0, i as f64 * 40.0, 100.0, 40.0));
            tree.append_child(container, item);
            items.push(item);
        }
        (tree, container, items)
    }

    fn relayout_stack(tree: &mut Tree, container: NodeId) {
        let children: Vec<NodeId> = tree.children(container).to_vec();
        let mut top = 0.0;
        for child in children {
            let r = tree.rect(child).unwrap();
            tree.set_rect(child, Rect::new(r.left, top, r.width, r.height));
            top += r.height;
        }
    }

    #[test]
    fn test_play_holds_moved_elements_at_old_position() {
        let (mut tree, container, items) = fixture();
        let mut scheduler = Scheduler::new();
        let mut events = EventDispatcher::new();
        let mut anim = AnimationState::default();

        let captured = CapturedLayout::capture(&tree, container, &Selector::Any);
        tree.insert_before(container, items[2], items[0]);
        relayout_stack(&mut tree, container);
        anim.play(&mut tree, &mut scheduler, &mut events, captured, 150, None);

        // Item 2 moved from y=80 to y=0: held 80px down
        assert_eq!(tree.transform(items[2]).unwrap().translation(), (0.0, 80.0));
        // Items 0 and 1 each shifted down 40px: held 40px up
        assert_eq!(tree.transform(items[0]).unwrap().translation(), (0.0, -40.0));
        assert!(anim.is_animating());

        // Visual rects are unchanged by the mutation
        assert_eq!(tree.visual_rect(items[2]).unwrap().top, 80.0);
    }

    #[test]
    fn test_done_clears_transform_and_emits() {
        let (mut tree, container, items) = fixture();
        let mut scheduler = Scheduler::new();
        let mut events = EventDispatcher::new();
        let mut anim = AnimationState::default();

        let captured = CapturedLayout::capture(&tree, container, &Selector::Any);
        tree.insert_after(container, items[0], items[1]);
        relayout_stack(&mut tree, container);
        anim.play(&mut tree, &mut scheduler, &mut events, captured, 150, None);
        events.take_events();

        for fired in scheduler.advance(150 * MS) {
            if let TaskKind::AnimationDone(node) = fired.kind {
                anim.on_done(&mut tree, &mut events, node);
            }
        }

        assert!(!anim.is_animating());
        assert!(tree.transform(items[0]).unwrap().is_identity());
        assert!(events
            .take_events()
            .iter()
            .any(|e| matches!(e, SortEvent::AnimationEnd { item } if *item == items[0])));
    }

    #[test]
    fn test_zero_duration_disables() {
        let (mut tree, container, items) = fixture();
        let mut scheduler = Scheduler::new();
        let mut events = EventDispatcher::new();
        let mut anim = AnimationState::default();

        let captured = CapturedLayout::capture(&tree, container, &Selector::Any);
        tree.insert_before(container, items[2], items[0]);
        relayout_stack(&mut tree, container);
        anim.play(&mut tree, &mut scheduler, &mut events, captured, 0, None);

        assert!(!anim.is_animating());
        assert!(tree.transform(items[2]).unwrap().is_identity());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_unmoved_elements_are_skipped() {
        let (mut tree, container, items) = fixture();
        let mut scheduler = Scheduler::new();
        let mut events = EventDispatcher::new();
        let mut anim = AnimationState::default();

        // Swap the last two; the first stays put
        let captured = CapturedLayout::capture(&tree, container, &Selector::Any);
        tree.insert_after(container, items[1], items[2]);
        relayout_stack(&mut tree, container);
        anim.play(&mut tree, &mut scheduler, &mut events, captured, 150, None);

        assert!(anim.record(items[0]).is_none());
        assert!(anim.record(items[1]).is_some());
        assert!(anim.record(items[2]).is_some());
    }

    #[test]
    fn test_interrupted_reversal_retimed_from_progress() {
        let (mut tree, container, items) = fixture();
        let mut scheduler = Scheduler::new();
        let mut events = EventDispatcher::new();
        let mut anim = AnimationState::default();

        // Leg 1: item 0 travels from y=0 to y=40 over 100ms
        let captured = CapturedLayout::capture(&tree, container, &Selector::Any);
        tree.insert_after(container, items[0], items[1]);
        relayout_stack(&mut tree, container);
        anim.play(&mut tree, &mut scheduler, &mut events, captured, 100, None);
        assert_eq!(anim.record(items[0]).unwrap().duration, 100 * MS);

        // 25ms in, swap straight back: the return leg starts from the
        // conceptual quarter-way point and takes a quarter of the base time
        scheduler.advance(25 * MS);
        let captured = CapturedLayout::capture(&tree, container, &Selector::Any);
        tree.insert_before(container, items[0], items[1]);
        relayout_stack(&mut tree, container);
        anim.play(&mut tree, &mut scheduler, &mut events, captured, 100, None);

        let leg = anim.record(items[0]).unwrap();
        assert_eq!(leg.duration, 25 * MS);
        assert_eq!(tree.transform(items[0]).unwrap().translation(), (0.0, 10.0));
    }

    #[test]
    fn test_easing_hint_recorded_and_emitted() {
        let (mut tree, container, items) = fixture();
        let mut scheduler = Scheduler::new();
        let mut events = EventDispatcher::new();
        let mut anim = AnimationState::default();

        let captured = CapturedLayout::capture(&tree, container, &Selector::Any);
        tree.insert_before(container, items[2], items[0]);
        relayout_stack(&mut tree, container);
        anim.play(
            &mut tree,
            &mut scheduler,
            &mut events,
            captured,
            150,
            Some("ease-out"),
        );

        assert_eq!(
            anim.record(items[2]).unwrap().easing.as_deref(),
            Some("ease-out")
        );
        assert!(events.take_events().iter().any(|e| matches!(
            e,
            SortEvent::AnimationStart { easing: Some(easing), .. } if easing == "ease-out"
        )));
    }

    #[test]
    fn test_cancel_all_snaps_and_notifies() {
        let (mut tree, container, items) = fixture();
        let mut scheduler = Scheduler::new();
        let mut events = EventDispatcher::new();
        let mut anim = AnimationState::default();

        let captured = CapturedLayout::capture(&tree, container, &Selector::Any);
        tree.insert_before(container, items[2], items[0]);
        relayout_stack(&mut tree, container);
        anim.play(&mut tree, &mut scheduler, &mut events, captured, 150, None);
        events.take_events();

        anim.cancel_all(&mut tree, &mut scheduler, &mut events);
        assert!(!anim.is_animating());
        assert_eq!(scheduler.pending_count(), 0);
        assert!(tree.transform(items[2]).unwrap().is_identity());
        assert!(events
            .take_events()
            .iter()
            .any(|e| matches!(e, SortEvent::AnimationCancel { .. })));
    }
}
