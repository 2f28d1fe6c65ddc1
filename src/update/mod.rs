//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through these functions: input messages
//! come in, the model (and the host tree, through the controller's
//! mutations) changes, events go out. Nothing here blocks; time-based
//! behavior is delegated to the scheduler.

mod drag;
mod session;

use crate::dom::{LayoutDriver, Tree};
use crate::events::EventDispatcher;
use crate::messages::InputMsg;
use crate::model::SortModel;
use crate::scheduler::Scheduler;

pub use session::{activate_pending, release, session_teardown};

/// Everything the update layer borrows from the engine for one message
pub struct EngineCtx<'a> {
    pub tree: &'a mut Tree,
    pub layout: &'a mut dyn LayoutDriver,
    pub scheduler: &'a mut Scheduler,
    pub events: &'a mut EventDispatcher,
}

/// Main update function - dispatches to sub-handlers.
///
/// Returns whether the engine consumed the input; the host can let
/// unconsumed presses fall through to its own interaction handling.
pub fn update(model: &mut SortModel, ctx: &mut EngineCtx, msg: InputMsg) -> bool {
    let consumed = match msg {
        InputMsg::PointerDown { pos, kind } => session::on_pointer_down(model, ctx, pos, kind),
        InputMsg::PointerMove { pos } => drag::on_pointer_move(model, ctx, pos),
        InputMsg::PointerUp { pos } => session::release(model, ctx, Some(pos)),
        InputMsg::PointerCancel => session::cancel(model, ctx),
        // The native drag protocol reuses the pointer paths: hover drives
        // placement, drop and dragend route through the single release path
        InputMsg::DragOver { pos } => drag::on_pointer_move(model, ctx, pos),
        InputMsg::Drop { pos } => session::release(model, ctx, Some(pos)),
        InputMsg::DragEnd => session::release(model, ctx, None),
    };
    model.store.validate();
    consumed
}
