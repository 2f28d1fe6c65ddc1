//! The engine facade
//!
//! [`Sortable`] owns the model, the scheduler, and the event dispatcher;
//! the host owns the element tree and a layout driver and lends both to
//! every call. A host integration loop looks like:
//!
//! ```text
//! loop {
//!     for input in platform_input() {
//!         engine.handle(&mut tree, &mut layout, input);
//!     }
//!     engine.advance(&mut tree, &mut layout, frame_dt);
//!     render(&tree);
//!     for event in engine.take_events() { apply(event); }
//! }
//! ```

use std::time::Duration;

use crate::config::SortOptions;
use crate::dom::{LayoutDriver, NodeId, Tree};
use crate::events::{EventDispatcher, SortEvent};
use crate::messages::InputMsg;
use crate::model::{DragPhase, SortModel, StoreChange};
use crate::scheduler::{Scheduler, TaskKind};
use crate::transfer::{self, DataTransfer, TransferPayload};
use crate::update::{self, EngineCtx};

/// Custom native-transfer payload writer (the `setData` hook)
type TransferWriter = Box<dyn FnMut(&mut DataTransfer, &TransferPayload)>;

/// A drag-to-reorder engine over a host-supplied element tree
#[derive(Default)]
pub struct Sortable {
    model: SortModel,
    scheduler: Scheduler,
    events: EventDispatcher,
    transfer_writer: Option<TransferWriter>,
}

impl std::fmt::Debug for Sortable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sortable")
            .field("model", &self.model)
            .field("scheduler", &self.scheduler)
            .field("events", &self.events)
            .field("transfer_writer", &self.transfer_writer.is_some())
            .finish()
    }
}

impl Sortable {
    pub fn new() -> Self {
        Self {
            model: SortModel::new(),
            ..Self::default()
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Register a container whose matching children become reorderable.
    /// Re-registering a node replaces its options.
    pub fn register_container(&mut self, node: NodeId, options: SortOptions) {
        self.model.register_container(node, options);
    }

    /// Register a lifecycle callback invoked synchronously for every event
    pub fn on(&mut self, callback: impl FnMut(&SortEvent) + 'static) {
        self.events.on(callback);
    }

    /// Observe state-store changes (phase transitions, position changes)
    pub fn subscribe(&mut self, observer: impl FnMut(&StoreChange) + 'static) {
        self.model.store.subscribe(observer);
    }

    /// Install a custom native-transfer payload writer, replacing the
    /// default JSON + plain-text shape
    pub fn set_transfer_writer(
        &mut self,
        writer: impl FnMut(&mut DataTransfer, &TransferPayload) + 'static,
    ) {
        self.transfer_writer = Some(Box::new(writer));
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.model.store.disabled = disabled;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.model.store.paused = paused;
    }

    /// Tell the engine whether the platform exposes the native drag
    /// protocol; without it every drag uses the pointer fallback
    pub fn set_native_supported(&mut self, supported: bool) {
        self.model.store.native_supported = supported;
    }

    // ========================================================================
    // Input and time
    // ========================================================================

    /// Feed one input message. Returns whether the engine consumed it.
    pub fn handle(
        &mut self,
        tree: &mut Tree,
        layout: &mut dyn LayoutDriver,
        msg: InputMsg,
    ) -> bool {
        let mut ctx = EngineCtx {
            tree,
            layout,
            scheduler: &mut self.scheduler,
            events: &mut self.events,
        };
        update::update(&mut self.model, &mut ctx, msg)
    }

    /// Advance the virtual clock and process everything that came due:
    /// delayed drag starts, animation completions, auto-scroll ticks.
    pub fn advance(&mut self, tree: &mut Tree, layout: &mut dyn LayoutDriver, dt: Duration) {
        let fired = self.scheduler.advance(dt);
        let mut ctx = EngineCtx {
            tree,
            layout,
            scheduler: &mut self.scheduler,
            events: &mut self.events,
        };
        for task in fired {
            match task.kind {
                TaskKind::DelayElapsed => update::activate_pending(&mut self.model, &mut ctx),
                TaskKind::AnimationDone(node) => {
                    self.model.animation.on_done(ctx.tree, ctx.events, node)
                }
                TaskKind::AutoScrollTick(node) => {
                    let speed = self
                        .model
                        .origin_options()
                        .map(|o| o.scroll_speed)
                        .unwrap_or_default();
                    self.model.autoscroll.on_tick(ctx.tree, node, speed);
                }
            }
        }
    }

    // ========================================================================
    // Native transfer
    // ========================================================================

    /// Populate the native transfer store for the current session at drag
    /// start. Returns `false` when no session is active.
    ///
    /// The payload kind and id come from the item's `data-kind` and
    /// `data-id` attributes when present; the id falls back to the node's
    /// arena index.
    pub fn fill_transfer(&mut self, tree: &Tree, transfer: &mut DataTransfer) -> bool {
        let Some(session) = self.model.store.session() else {
            return false;
        };
        let item = session.dragged;
        let payload = TransferPayload {
            kind: tree.attr(item, "data-kind").unwrap_or("item").to_string(),
            id: tree
                .attr(item, "data-id")
                .map(str::to_string)
                .unwrap_or_else(|| item.0.to_string()),
            index: session.current_index,
        };
        match &mut self.transfer_writer {
            Some(writer) => writer(transfer, &payload),
            None => transfer::write_payload(transfer, &payload),
        }
        true
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Drain queued lifecycle events in emission order
    pub fn take_events(&mut self) -> Vec<SortEvent> {
        self.events.take_events()
    }

    pub fn phase(&self) -> DragPhase {
        self.model.store.phase()
    }

    pub fn is_dragging(&self) -> bool {
        self.model.store.phase() == DragPhase::Dragging
    }

    /// Whether any FLIP animation still has a pending completion
    pub fn is_animating(&self) -> bool {
        self.model.animation.is_animating()
    }

    /// The fallback ghost node, while one exists. Hosts render it from its
    /// tree transform; it is hidden from layout and hit-testing.
    pub fn ghost_node(&self) -> Option<NodeId> {
        self.model.ghost.as_ref().map(|g| g.node)
    }

    /// Number of scheduled tasks still pending (delays, animation
    /// completions, auto-scroll ticks)
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending_count()
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Full engine teardown: the session (with its delay and auto-scroll
    /// tasks, ghost, and transient classes) plus every in-flight animation.
    /// Safe to call any number of times.
    pub fn teardown(&mut self, tree: &mut Tree, layout: &mut dyn LayoutDriver) {
        let mut ctx = EngineCtx {
            tree,
            layout,
            scheduler: &mut self.scheduler,
            events: &mut self.events,
        };
        update::session_teardown(&mut self.model, &mut ctx);
        self.model
            .animation
            .cancel_all(ctx.tree, ctx.scheduler, ctx.events);
    }
}
