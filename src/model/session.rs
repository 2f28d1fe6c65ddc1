//! Drag-session state and its guarded store
//!
//! The store is the single source of truth for one engine's drag session
//! and gates which operations are legal. Invalid combinations are logged
//! and self-healed on the next legal transition, never thrown. Consumers
//! observe changes through an explicit subscribe/notify mechanism; there is
//! no ambient reactivity and no global registry. The session object is
//! owned here and passed by reference.

use crate::dom::NodeId;
use crate::geometry::Point;

/// Lifecycle phase of a drag session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No session exists
    Idle,
    /// Press accepted; delay/threshold window not yet satisfied
    Pending,
    Dragging,
    /// Released; settle animation may still be running
    Settling,
}

/// Which input protocol drives the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Platform drag protocol (dragstart/dragover/drop)
    Native,
    /// Synthesized pointer-based emulation with a ghost clone
    Fallback,
}

/// The complete state of one in-progress reordering operation
#[derive(Debug, Clone)]
pub struct DragSession {
    pub dragged: NodeId,
    pub origin_container: NodeId,
    pub current_container: NodeId,
    pub origin_index: usize,
    pub current_index: usize,
    pub mode: DragMode,
    pub phase: DragPhase,
    /// Where the qualifying press happened
    pub press_origin: Point,
    /// Most recent pointer position seen by the controller
    pub last_pointer: Point,
    /// Whether the originating input was touch-based
    pub touch: bool,
}

/// Change notification delivered to store observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    PhaseChanged(DragPhase),
    /// The item's live position differs from where the session started
    PositionChanged {
        container: NodeId,
        index: usize,
    },
    SessionCleared,
}

/// Guarded holder of the [`DragSession`] plus engine-wide flags
#[derive(Default)]
pub struct StateStore {
    session: Option<DragSession>,
    pub disabled: bool,
    pub paused: bool,
    /// Whether the platform exposes the native drag protocol
    pub native_supported: bool,
    /// Set while a fallback-mode ghost is live
    pub fallback_active: bool,
    observers: Vec<Box<dyn FnMut(&StoreChange)>>,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("session", &self.session)
            .field("disabled", &self.disabled)
            .field("paused", &self.paused)
            .field("native_supported", &self.native_supported)
            .field("fallback_active", &self.fallback_active)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            native_supported: true,
            ..Self::default()
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut DragSession> {
        self.session.as_mut()
    }

    pub fn phase(&self) -> DragPhase {
        self.session
            .as_ref()
            .map(|s| s.phase)
            .unwrap_or(DragPhase::Idle)
    }

    /// Register a change observer
    pub fn subscribe(&mut self, observer: impl FnMut(&StoreChange) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, change: StoreChange) {
        for obs in &mut self.observers {
            obs(&change);
        }
    }

    /// Attempt to install a new session. Rejected (returning `false`) when
    /// the store is disabled, paused, or a session already exists.
    pub fn begin_session(&mut self, session: DragSession) -> bool {
        if self.disabled {
            tracing::debug!("drag start rejected: store disabled");
            return false;
        }
        if self.paused {
            tracing::debug!("drag start rejected: store paused");
            return false;
        }
        if self.session.is_some() {
            tracing::debug!("drag start rejected: session already active");
            return false;
        }
        let phase = session.phase;
        self.session = Some(session);
        self.notify(StoreChange::PhaseChanged(phase));
        true
    }

    pub fn set_phase(&mut self, phase: DragPhase) {
        let Some(session) = self.session.as_mut() else {
            tracing::warn!(?phase, "phase transition with no session ignored");
            return;
        };
        if session.phase == phase {
            return;
        }
        session.phase = phase;
        self.notify(StoreChange::PhaseChanged(phase));
    }

    /// Record the item's live position after a mutation. Observers are
    /// notified only when the position actually differs from where the
    /// session started.
    pub fn update_position(&mut self, container: NodeId, index: usize) {
        let Some(session) = self.session.as_mut() else {
            tracing::warn!("position update with no session ignored");
            return;
        };
        session.current_container = container;
        session.current_index = index;
        let moved = container != session.origin_container || index != session.origin_index;
        if moved {
            self.notify(StoreChange::PositionChanged { container, index });
        }
    }

    /// Drop the session unconditionally. Safe to call repeatedly.
    pub fn clear_session(&mut self) {
        if self.session.take().is_some() {
            self.fallback_active = false;
            self.notify(StoreChange::SessionCleared);
        }
    }

    /// Flag inconsistent combinations and self-heal. Never panics.
    pub fn validate(&mut self) {
        if self.fallback_active {
            let fallback_dragging = matches!(
                self.session.as_ref(),
                Some(s) if s.mode == DragMode::Fallback && s.phase == DragPhase::Dragging
            );
            if !fallback_dragging {
                tracing::warn!("fallback flag set without a fallback drag; clearing");
                self.fallback_active = false;
            }
        }
        if let Some(session) = &self.session {
            if session.phase == DragPhase::Idle {
                tracing::warn!("session present in idle phase; clearing");
                self.clear_session();
            }
        }
    }
}
