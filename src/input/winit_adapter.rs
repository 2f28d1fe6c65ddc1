//! Adapter to convert winit window events to our InputMsg type

use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};

use crate::geometry::Point;
use crate::messages::{InputMsg, PointerKind};

/// Stateful translator from winit window events to engine input.
///
/// winit reports button transitions without a position, so the adapter
/// remembers the last cursor location from `CursorMoved`.
#[derive(Debug, Default)]
pub struct WinitPointerAdapter {
    cursor: Option<Point>,
}

impl WinitPointerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one window event.
    ///
    /// Returns None for events the engine has no use for (keyboard, focus,
    /// resize, non-primary buttons).
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputMsg> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Point::new(position.x, position.y);
                self.cursor = Some(pos);
                Some(InputMsg::PointerMove { pos })
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let pos = self.cursor?;
                Some(match state {
                    ElementState::Pressed => InputMsg::PointerDown {
                        pos,
                        kind: PointerKind::Mouse,
                    },
                    ElementState::Released => InputMsg::PointerUp { pos },
                })
            }
            WindowEvent::Touch(Touch {
                phase, location, ..
            }) => {
                let pos = Point::new(location.x, location.y);
                self.cursor = Some(pos);
                Some(match phase {
                    TouchPhase::Started => InputMsg::PointerDown {
                        pos,
                        kind: PointerKind::Touch,
                    },
                    TouchPhase::Moved => InputMsg::PointerMove { pos },
                    TouchPhase::Ended => InputMsg::PointerUp { pos },
                    TouchPhase::Cancelled => InputMsg::PointerCancel,
                })
            }
            _ => None,
        }
    }
}
