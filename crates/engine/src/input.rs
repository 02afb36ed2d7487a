use crate::prelude::*;

use std::sync::Arc;
use winit::window::{CursorGrabMode, Window};

/// A single pointer signal, in the order it was delivered by the window system
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// A mouse button went down over the window
    Pressed,
    /// A mouse button was released
    Released,
    /// Relative pointer movement in pixels
    Motion { dx: f32, dy: f32 },
    /// The window lost focus, taking any pointer capture with it
    CaptureLost,
}

/// Resource that queues pointer input between frames
#[derive(Resource, Default)]
pub struct PointerInput {
    /// Events received since the last drain, oldest first
    events: Vec<PointerEvent>,
    /// Last known cursor position in window coordinates
    position: Option<(f32, f32)>,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PointerEvent) {
        self.events.push(event);
    }

    /// Take every queued event, preserving delivery order
    pub fn drain(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Some((x, y));
    }

    /// Cursor position, or `None` until the cursor has entered the window
    pub fn position(&self) -> Option<(f32, f32)> {
        self.position
    }
}

/// Exclusive pointer capture on an input surface.
///
/// Callers are responsible for pairing every `acquire` with a `release`.
pub trait PointerCapture {
    fn acquire(&mut self);
    fn release(&mut self);
}

/// Pointer capture backed by the winit cursor grab
#[derive(Resource)]
pub struct CursorCapture {
    window: Arc<Window>,
}

impl CursorCapture {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl PointerCapture for CursorCapture {
    fn acquire(&mut self) {
        // Not every platform supports a locked cursor
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));

        match grabbed {
            Ok(()) => {
                self.window.set_cursor_visible(false);
                log::debug!("Pointer captured");
            }
            Err(e) => log::warn!("Unable to capture pointer: {}", e),
        }
    }

    fn release(&mut self) {
        self.window.set_cursor_visible(true);
        if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("Unable to release pointer: {}", e);
        }
        log::debug!("Pointer released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order_and_empties_queue() {
        let mut input = PointerInput::new();
        input.push(PointerEvent::Pressed);
        input.push(PointerEvent::Motion { dx: 3.0, dy: -1.0 });
        input.push(PointerEvent::Released);

        let events = input.drain();
        assert_eq!(
            events,
            vec![
                PointerEvent::Pressed,
                PointerEvent::Motion { dx: 3.0, dy: -1.0 },
                PointerEvent::Released,
            ]
        );
        assert!(input.drain().is_empty());
    }

    #[test]
    fn position_is_unknown_until_cursor_moves() {
        let mut input = PointerInput::new();
        assert_eq!(input.position(), None);

        input.set_position(120.0, 40.0);
        assert_eq!(input.position(), Some((120.0, 40.0)));
    }
}
