//! Drag-session lifecycle: press qualification, activation, release
//!
//! A qualifying press creates a pending session; the session becomes a real
//! drag once the delay window (if any) elapses without disqualifying
//! movement. Release, drop, dragend, and pointercancel all route through
//! the same teardown path, which is safe to invoke any number of times.

use std::time::Duration;

use tracing::{debug, info};

use crate::events::SortEvent;
use crate::geometry::Point;
use crate::ghost;
use crate::messages::PointerKind;
use crate::model::{DragMode, DragPhase, DragSession, SortModel};
use crate::scheduler::TaskKind;

use super::drag;
use super::EngineCtx;

/// Handle a primary press. Returns whether the engine consumed it.
pub(super) fn on_pointer_down(
    model: &mut SortModel,
    ctx: &mut EngineCtx,
    pos: Point,
    kind: PointerKind,
) -> bool {
    if model.store.session().is_some() {
        debug!("press ignored: session already active");
        return false;
    }
    let Some(hit) = ctx.tree.element_from_point(pos) else {
        return false;
    };
    let Some((container, item)) = drag::locate_item(model, ctx.tree, hit) else {
        return false;
    };
    let options = match model.binding(container) {
        Some(b) => b.options.clone(),
        None => return false,
    };
    if options.disabled {
        return false;
    }

    // A press on a filtered element never starts a drag
    if let Some(filter) = &options.filter {
        if ctx.tree.closest(hit, filter, container).is_some() {
            ctx.events.emit(SortEvent::Filter { item, container });
            return options.prevent_on_filter;
        }
    }
    // With a handle configured, only presses inside it qualify
    if let Some(handle) = &options.handle {
        if ctx.tree.closest(hit, handle, container).is_none() {
            return false;
        }
    }

    let Some(index) = ctx.tree.index_of_matching(container, item, &options.draggable) else {
        return false;
    };
    let session = DragSession {
        dragged: item,
        origin_container: container,
        current_container: container,
        origin_index: index,
        current_index: index,
        // Real mode is selected at activation
        mode: DragMode::Native,
        phase: DragPhase::Pending,
        press_origin: pos,
        last_pointer: pos,
        touch: kind.is_touch(),
    };
    if !model.store.begin_session(session) {
        return false;
    }

    ctx.tree.add_class(item, &options.chosen_class);
    ctx.events.emit(SortEvent::Choose {
        item,
        container,
        index,
    });

    let delayed = options.delay_ms > 0 && (!options.delay_on_touch_only || kind.is_touch());
    if delayed {
        model.delay_task = Some(ctx.scheduler.schedule_once(
            TaskKind::DelayElapsed,
            Duration::from_millis(options.delay_ms),
        ));
        debug!(delay_ms = options.delay_ms, "drag start delayed");
    } else {
        activate_pending(model, ctx);
    }
    true
}

/// Promote a pending session to a real drag: pick the input mode, create
/// the ghost if fallback, enter the dragging phase, and announce the start.
///
/// Called immediately for undelayed presses and from the delay task for
/// delayed ones. A no-op unless a pending session exists.
pub fn activate_pending(model: &mut SortModel, ctx: &mut EngineCtx) {
    model.delay_task = None;
    let Some(session) = model.store.session().cloned() else {
        return;
    };
    if session.phase != DragPhase::Pending {
        return;
    }
    let Some(options) = model.origin_options().cloned() else {
        // Container was unregistered out from under the press
        session_teardown(model, ctx);
        return;
    };

    let mode = if options.force_fallback || !model.store.native_supported || session.touch {
        DragMode::Fallback
    } else {
        DragMode::Native
    };
    if let Some(s) = model.store.session_mut() {
        s.mode = mode;
    }

    ctx.tree.add_class(session.dragged, &options.ghost_class);
    if mode == DragMode::Fallback {
        let Some(g) = ghost::create_ghost(
            ctx.tree,
            session.dragged,
            session.origin_container,
            &options,
            session.press_origin,
        ) else {
            session_teardown(model, ctx);
            return;
        };
        ghost::position_ghost(ctx.tree, &g, session.last_pointer, options.fallback_offset);
        model.ghost = Some(g);
        model.store.fallback_active = true;
    }

    model.store.set_phase(DragPhase::Dragging);
    ctx.events.emit(SortEvent::Start {
        item: session.dragged,
        container: session.origin_container,
        index: session.origin_index,
    });
    info!(item = ?session.dragged, ?mode, "drag started");
}

/// Finish the session at its current position.
///
/// `pos` is the release point when the input protocol supplies one
/// (pointerup, drop); dragend finalizes at the last pointer seen. A release
/// during the pending phase is just a click: the session dissolves without
/// `Start` ever having fired, so no further events are emitted.
pub fn release(model: &mut SortModel, ctx: &mut EngineCtx, pos: Option<Point>) -> bool {
    let Some(session) = model.store.session().cloned() else {
        return false;
    };
    if let (Some(p), Some(s)) = (pos, model.store.session_mut()) {
        s.last_pointer = p;
    }
    if session.phase != DragPhase::Dragging {
        session_teardown(model, ctx);
        return true;
    }

    model.store.set_phase(DragPhase::Settling);

    let new_index = final_index(model, ctx, &session);
    let crossed = session.current_container != session.origin_container;
    if crossed {
        ctx.events.emit(SortEvent::Remove {
            item: session.dragged,
            container: session.origin_container,
            index: session.origin_index,
        });
        ctx.events.emit(SortEvent::Add {
            item: session.dragged,
            container: session.current_container,
            from_container: session.origin_container,
            index: new_index,
        });
    } else if new_index != session.origin_index {
        ctx.events.emit(SortEvent::Update {
            item: session.dragged,
            from_container: session.origin_container,
            to_container: session.current_container,
            old_index: session.origin_index,
            new_index,
        });
    }
    ctx.events.emit(SortEvent::End {
        item: session.dragged,
        container: session.current_container,
        old_index: session.origin_index,
        new_index,
    });
    info!(item = ?session.dragged, old = session.origin_index, new = new_index, "drag ended");

    session_teardown(model, ctx);
    true
}

/// Abort the session, reverting the item to where the drag began.
pub(super) fn cancel(model: &mut SortModel, ctx: &mut EngineCtx) -> bool {
    let Some(session) = model.store.session().cloned() else {
        return false;
    };
    if session.phase != DragPhase::Dragging {
        session_teardown(model, ctx);
        return true;
    }

    let moved = session.current_container != session.origin_container
        || final_index(model, ctx, &session) != session.origin_index;
    if moved {
        drag::restore_origin_position(model, ctx, &session);
    }
    ctx.events.emit(SortEvent::End {
        item: session.dragged,
        container: session.origin_container,
        old_index: session.origin_index,
        new_index: session.origin_index,
    });
    debug!(item = ?session.dragged, "drag cancelled");

    session_teardown(model, ctx);
    true
}

/// Unconditional, idempotent session teardown: delay task, auto-scroll
/// tasks, ghost node, transient classes, and the session itself. In-flight
/// settle animations are left to finish on their own.
pub fn session_teardown(model: &mut SortModel, ctx: &mut EngineCtx) {
    if let Some(task) = model.delay_task.take() {
        ctx.scheduler.cancel(task);
    }
    model.autoscroll.stop_all(ctx.scheduler);
    if let Some(g) = model.ghost.take() {
        ghost::remove_ghost(ctx.tree, &g);
    }
    if let Some(session) = model.store.session() {
        let item = session.dragged;
        let options = model.origin_options().cloned().unwrap_or_default();
        ctx.tree.remove_class(item, &options.chosen_class);
        ctx.tree.remove_class(item, &options.ghost_class);
    }
    model.last_move_processed = None;
    model.store.clear_session();
}

/// The item's index among its current container's matching children,
/// re-derived from live tree position
fn final_index(model: &SortModel, ctx: &EngineCtx, session: &DragSession) -> usize {
    let selector = model
        .binding(session.current_container)
        .map(|b| b.options.draggable.clone())
        .unwrap_or(crate::dom::Selector::Any);
    ctx.tree
        .index_of_matching(session.current_container, session.dragged, &selector)
        .unwrap_or(session.current_index)
}
