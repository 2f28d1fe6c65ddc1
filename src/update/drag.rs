//! Pointer-move handling: hit-testing, placement, and mutation
//!
//! Every move resolves the element under the pointer, finds the candidate
//! target item in whichever registered container the pointer is over, and
//! asks the placement calculator where the dragged item should land. A
//! decision mutates the tree inside a FLIP capture/play pair and re-derives
//! the live index. Reordering is throttled to roughly frame rate; the ghost
//! and auto-scroll evaluation run on every move.

use std::time::Duration;

use tracing::debug;

use crate::animation::CapturedLayout;
use crate::config::SortOptions;
use crate::dom::{NodeId, Tree};
use crate::geometry::{infer_axis, placement, Axis, Placement, Point};
use crate::ghost;
use crate::model::{DragPhase, DragSession, SortModel};

use super::EngineCtx;

/// Minimum time between reorder decisions
const MOVE_THROTTLE: Duration = Duration::from_millis(16);

pub(super) fn on_pointer_move(model: &mut SortModel, ctx: &mut EngineCtx, pos: Point) -> bool {
    let Some(session) = model.store.session().cloned() else {
        return false;
    };
    if let Some(s) = model.store.session_mut() {
        s.last_pointer = pos;
    }
    match session.phase {
        DragPhase::Pending => {
            // Movement beyond the threshold disqualifies a delayed start
            let options = model.origin_options().cloned().unwrap_or_default();
            let dx = pos.x - session.press_origin.x;
            let dy = pos.y - session.press_origin.y;
            if (dx * dx + dy * dy).sqrt() > options.touch_start_threshold {
                debug!("pending drag cancelled by movement");
                super::session::session_teardown(model, ctx);
            }
            true
        }
        DragPhase::Dragging => {
            process_move(model, ctx, pos, &session);
            true
        }
        _ => false,
    }
}

fn process_move(model: &mut SortModel, ctx: &mut EngineCtx, pos: Point, session: &DragSession) {
    let Some(origin_options) = model.origin_options().cloned() else {
        super::session::session_teardown(model, ctx);
        return;
    };

    // The ghost tracks every raw move; so does auto-scroll evaluation,
    // which throttles itself
    if let Some(g) = &model.ghost {
        ghost::position_ghost(ctx.tree, g, pos, origin_options.fallback_offset);
    }
    model
        .autoscroll
        .evaluate(ctx.tree, ctx.scheduler, pos, &origin_options);

    let now = ctx.scheduler.now();
    if let Some(last) = model.last_move_processed {
        if now.saturating_sub(last) < MOVE_THROTTLE {
            return;
        }
    }
    model.last_move_processed = Some(now);

    let Some(hit) = ctx.tree.element_from_point(pos) else {
        return;
    };
    let Some(target_container) = containing_binding(model, ctx.tree, hit) else {
        return;
    };
    let target_options = match model.binding(target_container) {
        Some(b) => b.options.clone(),
        None => return,
    };
    if target_container != session.origin_container
        && (target_options.disabled || !accepts(&origin_options, &target_options))
    {
        return;
    }

    let target_item = item_in(ctx.tree, target_container, hit, &target_options)
        .filter(|&t| t != session.dragged);

    match target_item {
        None => {
            // Blank space or the container itself: entering another list
            // appends at the end
            if target_container != session.current_container {
                apply_move(model, ctx, session, target_container, |tree, dragged| {
                    tree.append_child(target_container, dragged);
                });
            }
        }
        Some(target) => {
            let Some(target_rect) = ctx.tree.rect(target) else {
                return;
            };
            let axis = container_axis(ctx.tree, target_container, &target_options);
            let decision = placement(
                pos,
                target_rect,
                axis,
                target_options.effective_swap_threshold(),
                target_options.invert_swap,
                target_options.effective_inverted_threshold(),
            );
            let Some(place) = decision else {
                return;
            };
            if is_noop(ctx.tree, target_container, session.dragged, target, place) {
                return;
            }
            apply_move(model, ctx, session, target_container, |tree, dragged| {
                match place {
                    Placement::Before => tree.insert_before(target_container, dragged, target),
                    Placement::After => tree.insert_after(target_container, dragged, target),
                }
            });
        }
    }
}

/// Perform one tree mutation inside a FLIP capture/play pair, relayout the
/// affected containers, and record the re-derived index.
fn apply_move(
    model: &mut SortModel,
    ctx: &mut EngineCtx,
    session: &DragSession,
    target_container: NodeId,
    mutate: impl FnOnce(&mut Tree, NodeId),
) {
    let from_container = session.current_container;
    let from_options = model
        .binding(from_container)
        .map(|b| b.options.clone())
        .unwrap_or_default();
    let to_options = if target_container == from_container {
        from_options.clone()
    } else {
        model
            .binding(target_container)
            .map(|b| b.options.clone())
            .unwrap_or_default()
    };

    let captured_from = CapturedLayout::capture(ctx.tree, from_container, &from_options.draggable);
    let captured_to = (target_container != from_container)
        .then(|| CapturedLayout::capture(ctx.tree, target_container, &to_options.draggable));

    mutate(ctx.tree, session.dragged);

    ctx.layout.relayout(ctx.tree, from_container);
    if target_container != from_container {
        ctx.layout.relayout(ctx.tree, target_container);
    }

    // Each list animates with its own duration and easing; the dragged
    // item travels under the options of the list it left.
    model.animation.play(
        ctx.tree,
        ctx.scheduler,
        ctx.events,
        captured_from,
        from_options.animation_ms,
        from_options.easing.as_deref(),
    );
    if let Some(captured) = captured_to {
        model.animation.play(
            ctx.tree,
            ctx.scheduler,
            ctx.events,
            captured,
            to_options.animation_ms,
            to_options.easing.as_deref(),
        );
    }

    let new_index = ctx
        .tree
        .index_of_matching(target_container, session.dragged, &to_options.draggable)
        .unwrap_or(session.current_index);
    model.store.update_position(target_container, new_index);
    debug!(item = ?session.dragged, container = ?target_container, new_index, "item moved");
}

/// Put the dragged item back at its origin index (for cancellation)
pub(super) fn restore_origin_position(
    model: &mut SortModel,
    ctx: &mut EngineCtx,
    session: &DragSession,
) {
    let selector = model
        .binding(session.origin_container)
        .map(|b| b.options.draggable.clone())
        .unwrap_or_default();
    let origin = session.origin_container;
    let index = session.origin_index;
    apply_move(model, ctx, session, origin, |tree, dragged| {
        let siblings: Vec<NodeId> = tree
            .children_matching(origin, &selector)
            .into_iter()
            .filter(|&c| c != dragged)
            .collect();
        match siblings.get(index) {
            Some(&reference) => tree.insert_before(origin, dragged, reference),
            None => tree.append_child(origin, dragged),
        }
    });
}

/// The registered container (nearest first) that `hit` falls inside
pub(super) fn containing_binding(model: &SortModel, tree: &Tree, hit: NodeId) -> Option<NodeId> {
    let mut cur = Some(hit);
    while let Some(n) = cur {
        if model.binding(n).is_some() {
            return Some(n);
        }
        cur = tree.parent(n);
    }
    None
}

/// The draggable item of `container` that `hit` falls inside, plus the
/// container, for press qualification
pub(super) fn locate_item(model: &SortModel, tree: &Tree, hit: NodeId) -> Option<(NodeId, NodeId)> {
    let container = containing_binding(model, tree, hit)?;
    let options = &model.binding(container)?.options;
    let item = item_in(tree, container, hit, options)?;
    Some((container, item))
}

/// The direct child of `container` on the ancestor path of `hit` that
/// matches the container's draggable predicate
fn item_in(tree: &Tree, container: NodeId, hit: NodeId, options: &SortOptions) -> Option<NodeId> {
    let mut cur = hit;
    loop {
        let parent = tree.parent(cur)?;
        if parent == container {
            return options.draggable.matches(tree, cur).then_some(cur);
        }
        cur = parent;
    }
}

/// Layout axis of a container: declared axis, else inferred from the first
/// two matching children
fn container_axis(tree: &Tree, container: NodeId, options: &SortOptions) -> Axis {
    let kids = tree.children_matching(container, &options.draggable);
    let first = kids.first().and_then(|&k| tree.rect(k));
    let second = kids.get(1).and_then(|&k| tree.rect(k));
    infer_axis(tree.layout_axis(container), first, second)
}

/// Whether the decided insertion would leave the order unchanged
fn is_noop(
    tree: &Tree,
    container: NodeId,
    dragged: NodeId,
    target: NodeId,
    place: Placement,
) -> bool {
    let children = tree.children(container);
    let Some(t_pos) = children.iter().position(|&c| c == target) else {
        return true;
    };
    let Some(d_pos) = children.iter().position(|&c| c == dragged) else {
        return false;
    };
    match place {
        Placement::Before => d_pos + 1 == t_pos,
        Placement::After => t_pos + 1 == d_pos,
    }
}

/// Cross-list gating: same group name, origin allows pull, target allows put
fn accepts(origin: &SortOptions, target: &SortOptions) -> bool {
    match (origin.resolved_group(), target.resolved_group()) {
        (Some(from), Some(to)) => from.name == to.name && from.pull && to.put,
        _ => false,
    }
}
