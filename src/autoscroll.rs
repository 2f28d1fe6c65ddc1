//! Edge-proximity auto-scroll
//!
//! Dragging near the edge of a scrollable ancestor scrolls it so targets
//! outside the viewport can be reached. Velocity is evaluated from pointer
//! position (throttled, since pointer moves arrive much faster than scroll
//! ticks) and applied on a fixed repeating interval per scroller. A
//! scroller whose range is exhausted in the active direction stops
//! scrolling but stays monitored; reversing the pointer can wake it again.

use std::time::Duration;

use crate::config::SortOptions;
use crate::dom::{NodeId, Tree};
use crate::geometry::Point;
use crate::scheduler::{Scheduler, TaskHandle, TaskKind};

/// Interval between scroll applications for an active scroller
pub const AUTOSCROLL_TICK_MS: u64 = 24;

/// Minimum time between velocity re-evaluations
const EVAL_THROTTLE_MS: u64 = 30;

/// One scrollable ancestor currently being driven
#[derive(Debug, Clone, Copy)]
struct ScrollTarget {
    node: NodeId,
    /// Per-axis velocity in {-1, 0, 1}
    vx: f64,
    vy: f64,
    task: TaskHandle,
}

/// Auto-scroll bookkeeping for one engine
#[derive(Debug, Default)]
pub struct AutoScrollState {
    targets: Vec<ScrollTarget>,
    last_eval: Option<Duration>,
}

impl AutoScrollState {
    pub fn is_scrolling(&self) -> bool {
        self.targets.iter().any(|t| t.vx != 0.0 || t.vy != 0.0)
    }

    /// Re-derive velocities for the scrollable ancestors under the pointer.
    ///
    /// With `bubble_scroll` every scrollable ancestor is considered, so a
    /// nested list can scroll its own pane and the page behind it at once;
    /// without it only the nearest one is.
    pub fn evaluate(
        &mut self,
        tree: &Tree,
        scheduler: &mut Scheduler,
        pointer: Point,
        options: &SortOptions,
    ) {
        if !options.scroll {
            return;
        }
        let now = scheduler.now();
        if let Some(last) = self.last_eval {
            if now.saturating_sub(last) < Duration::from_millis(EVAL_THROTTLE_MS) {
                return;
            }
        }
        self.last_eval = Some(now);

        let hovered = tree.element_from_point(pointer).unwrap_or_else(|| tree.root());
        let mut ancestors = tree.scrollable_ancestors(hovered);
        if !options.bubble_scroll {
            ancestors.truncate(1);
        }

        for node in &ancestors {
            let node = *node;
            let (vx, vy) = velocity(tree, node, pointer, options.scroll_sensitivity);
            match self.targets.iter_mut().find(|t| t.node == node) {
                Some(target) => {
                    target.vx = vx;
                    target.vy = vy;
                }
                None if vx != 0.0 || vy != 0.0 => {
                    let task = scheduler.schedule_repeating(
                        TaskKind::AutoScrollTick(node),
                        Duration::from_millis(AUTOSCROLL_TICK_MS),
                    );
                    tracing::debug!(?node, vx, vy, "autoscroll engaged");
                    self.targets.push(ScrollTarget { node, vx, vy, task });
                }
                None => {}
            }
        }

        // Scrollers the pointer has left are dropped entirely
        let stale: Vec<TaskHandle> = self
            .targets
            .iter()
            .filter(|t| !ancestors.contains(&t.node))
            .map(|t| t.task)
            .collect();
        if !stale.is_empty() {
            self.targets.retain(|t| ancestors.contains(&t.node));
            for task in stale {
                scheduler.cancel(task);
            }
        }
    }

    /// An [`TaskKind::AutoScrollTick`] task fired: apply one scroll step
    pub fn on_tick(&mut self, tree: &mut Tree, node: NodeId, scroll_speed: f64) {
        let Some(target) = self.targets.iter_mut().find(|t| t.node == node) else {
            return;
        };
        let Some(scroll) = tree.scroll(node) else {
            return;
        };
        // Zero out exhausted directions rather than pushing at the clamp
        if target.vx != 0.0 && !scroll.can_scroll_x(target.vx) {
            target.vx = 0.0;
        }
        if target.vy != 0.0 && !scroll.can_scroll_y(target.vy) {
            target.vy = 0.0;
        }
        if target.vx != 0.0 || target.vy != 0.0 {
            tree.scroll_by(node, target.vx * scroll_speed, target.vy * scroll_speed);
        }
    }

    /// Cancel every scroll task and forget all targets
    pub fn stop_all(&mut self, scheduler: &mut Scheduler) {
        for target in self.targets.drain(..) {
            scheduler.cancel(target.task);
        }
        self.last_eval = None;
    }
}

/// Velocity for one scroller: ±1 per axis when the pointer is within
/// `sensitivity` of an edge that still has scroll room, else 0.
fn velocity(tree: &Tree, node: NodeId, pointer: Point, sensitivity: f64) -> (f64, f64) {
    let Some(rect) = tree.rect(node) else {
        return (0.0, 0.0);
    };
    let Some(scroll) = tree.scroll(node) else {
        return (0.0, 0.0);
    };

    let vx = if rect.right() - pointer.x <= sensitivity && scroll.can_scroll_x(1.0) {
        1.0
    } else if pointer.x - rect.left <= sensitivity && scroll.can_scroll_x(-1.0) {
        -1.0
    } else {
        0.0
    };
    let vy = if rect.bottom() - pointer.y <= sensitivity && scroll.can_scroll_y(1.0) {
        1.0
    } else if pointer.y - rect.top <= sensitivity && scroll.can_scroll_y(-1.0) {
        -1.0
    } else {
        0.0
    };
    (vx, vy)
}
