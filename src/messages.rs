//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types: the host translates
//! its platform's input into [`InputMsg`] values and feeds them to the
//! engine, which is the only place state is mutated.

use crate::geometry::Point;

/// What produced a pointer press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Touch-like input gets the delay window and fallback-mode treatment
    pub fn is_touch(self) -> bool {
        matches!(self, PointerKind::Touch | PointerKind::Pen)
    }
}

/// Pointer and drag-protocol input, in host coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMsg {
    // === Pointer protocol (drives fallback mode and press qualification) ===
    /// Primary button / contact went down
    PointerDown { pos: Point, kind: PointerKind },
    /// Pointer moved while down
    PointerMove { pos: Point },
    /// Primary button / contact released
    PointerUp { pos: Point },
    /// The platform cancelled the pointer stream (e.g. touch interrupted)
    PointerCancel,

    // === Native drag protocol (host forwards these when native mode runs) ===
    /// Native drag hover over the host surface
    DragOver { pos: Point },
    /// Native drop at a position
    Drop { pos: Point },
    /// Native drag ended without a drop (escape, dropped outside)
    DragEnd,
}

// Convenience constructors for common messages
impl InputMsg {
    /// A mouse press at (x, y)
    pub fn mouse_down(x: f64, y: f64) -> Self {
        InputMsg::PointerDown {
            pos: Point::new(x, y),
            kind: PointerKind::Mouse,
        }
    }

    /// A touch press at (x, y)
    pub fn touch_down(x: f64, y: f64) -> Self {
        InputMsg::PointerDown {
            pos: Point::new(x, y),
            kind: PointerKind::Touch,
        }
    }

    /// A pointer move to (x, y)
    pub fn moved(x: f64, y: f64) -> Self {
        InputMsg::PointerMove {
            pos: Point::new(x, y),
        }
    }

    /// A release at (x, y)
    pub fn up(x: f64, y: f64) -> Self {
        InputMsg::PointerUp {
            pos: Point::new(x, y),
        }
    }
}
