//! Engine model - the complete state of one reorder engine
//!
//! Aggregates the guarded session store, the registered containers with
//! their options, and the per-subsystem state (ghost, animation,
//! auto-scroll) following the Elm Architecture pattern: the update layer
//! mutates this model in response to input messages, nothing else does.

pub mod session;

pub use session::{DragMode, DragPhase, DragSession, StateStore, StoreChange};

use std::time::Duration;

use crate::animation::AnimationState;
use crate::autoscroll::AutoScrollState;
use crate::config::SortOptions;
use crate::dom::NodeId;
use crate::ghost::GhostState;
use crate::scheduler::TaskHandle;

/// A container registered with the engine, with its own options
#[derive(Debug, Clone)]
pub struct ContainerBinding {
    pub node: NodeId,
    pub options: SortOptions,
}

/// The complete engine model
#[derive(Debug, Default)]
pub struct SortModel {
    /// Guarded drag-session store
    pub store: StateStore,
    /// Containers participating in reordering (cross-list via `group`)
    pub containers: Vec<ContainerBinding>,
    /// Fallback-mode ghost, present iff mode=fallback and phase=dragging
    pub ghost: Option<GhostState>,
    pub animation: AnimationState,
    pub autoscroll: AutoScrollState,
    /// Pending delayed-start task, if a delay window is open
    pub delay_task: Option<TaskHandle>,
    /// Clock stamp of the last processed move (for throttling)
    pub last_move_processed: Option<Duration>,
}

impl SortModel {
    pub fn new() -> Self {
        Self {
            store: StateStore::new(),
            ..Self::default()
        }
    }

    /// Register a container. Re-registering a node replaces its options.
    pub fn register_container(&mut self, node: NodeId, options: SortOptions) {
        if let Some(existing) = self.containers.iter_mut().find(|c| c.node == node) {
            existing.options = options;
        } else {
            self.containers.push(ContainerBinding { node, options });
        }
    }

    pub fn binding(&self, node: NodeId) -> Option<&ContainerBinding> {
        self.containers.iter().find(|c| c.node == node)
    }

    /// Options of the session's origin container, if a session exists
    pub fn origin_options(&self) -> Option<&SortOptions> {
        let origin = self.store.session()?.origin_container;
        self.binding(origin).map(|b| &b.options)
    }
}
