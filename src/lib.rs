//! dragsort - Elm-style drag-to-reorder engine
//!
//! This crate provides the core types and logic for a headless
//! drag-to-reorder engine over a host-supplied element tree, implementing
//! the Elm Architecture pattern: the host feeds input messages and advances
//! a virtual clock; the engine mutates the tree, animates the changes, and
//! emits lifecycle events.

pub mod animation;
pub mod autoscroll;
pub mod config;
pub mod config_paths;
pub mod dom;
pub mod events;
pub mod geometry;
pub mod ghost;
pub mod input;
pub mod messages;
pub mod model;
pub mod scheduler;
pub mod sortable;
pub mod tracing;
pub mod transfer;
pub mod update;

// Re-export commonly used types
pub use config::SortOptions;
pub use dom::{LayoutDriver, NodeId, Selector, Tree};
pub use events::SortEvent;
pub use geometry::{Axis, Point, Rect};
pub use messages::{InputMsg, PointerKind};
pub use model::{DragMode, DragPhase};
pub use sortable::Sortable;
pub use transfer::{DataTransfer, TransferPayload};
