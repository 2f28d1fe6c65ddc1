//! Lifecycle notification fan-out
//!
//! Every transition of a drag session is surfaced twice with identical
//! data: synchronously to registered callbacks, and into a queue the host
//! drains on its own schedule (the platform-event analog). The dispatcher
//! itself has no opinion about ordering beyond emission order.

use std::collections::VecDeque;

use crate::dom::NodeId;

/// A lifecycle notification from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortEvent {
    /// An item qualified as the drag candidate. Emitted at press time;
    /// any configured delay window runs after it.
    Choose {
        item: NodeId,
        container: NodeId,
        index: usize,
    },
    /// The drag session entered the dragging phase
    Start {
        item: NodeId,
        container: NodeId,
        index: usize,
    },
    /// The item settled at a different index than it started
    Update {
        item: NodeId,
        from_container: NodeId,
        to_container: NodeId,
        old_index: usize,
        new_index: usize,
    },
    /// An item entered this container from another grouped list
    Add {
        item: NodeId,
        container: NodeId,
        from_container: NodeId,
        index: usize,
    },
    /// An item left this container for another grouped list
    Remove {
        item: NodeId,
        container: NodeId,
        index: usize,
    },
    /// The drag session ended (always follows a start, moved or not)
    End {
        item: NodeId,
        container: NodeId,
        old_index: usize,
        new_index: usize,
    },
    /// A press matched the `filter` selector and was rejected
    Filter { item: NodeId, container: NodeId },
    /// An element started traveling to a new layout position. `easing` is
    /// the configured hint for the host renderer's interpolation.
    AnimationStart {
        item: NodeId,
        easing: Option<String>,
    },
    AnimationEnd { item: NodeId },
    AnimationCancel { item: NodeId },
}

/// Callback + queue fan-out for [`SortEvent`]s
#[derive(Default)]
pub struct EventDispatcher {
    callbacks: Vec<Box<dyn FnMut(&SortEvent)>>,
    queue: VecDeque<SortEvent>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("callbacks", &self.callbacks.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked synchronously for every event
    pub fn on(&mut self, callback: impl FnMut(&SortEvent) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Deliver an event to callbacks and enqueue it for the host
    pub fn emit(&mut self, event: SortEvent) {
        tracing::trace!(target: "events", ?event, "dispatch");
        for cb in &mut self.callbacks {
            cb(&event);
        }
        self.queue.push_back(event);
    }

    /// Drain all queued events in emission order
    pub fn take_events(&mut self) -> Vec<SortEvent> {
        self.queue.drain(..).collect()
    }
}
