use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Pointer events in viewport-local coordinates.
/// Mouse and touch both map onto these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// A touch/click began at (x, y).
    Down { x: f32, y: f32 },
    /// A touch/cursor moved to (x, y).
    Move { x: f32, y: f32 },
    /// A touch/click ended at (x, y).
    Up { x: f32, y: f32 },
}

impl PointerEvent {
    pub fn pos(&self) -> Vec2 {
        match *self {
            PointerEvent::Down { x, y } | PointerEvent::Move { x, y } | PointerEvent::Up { x, y } => {
                Vec2::new(x, y)
            }
        }
    }
}

/// A queue of pointer events.
/// The host pushes events as they arrive; the director drains them once per frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<PointerEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: PointerEvent) {
        self.events.push(event);
    }

    /// Drain all pending events in arrival order.
    pub fn drain(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
