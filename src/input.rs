use std::collections::VecDeque;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};

/// Input the viewer reacts to, already stripped of window-system detail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewerEvent {
    /// Left button went down with the pointer at `(x, y)`.
    PointerPress { x: f32, y: f32 },
    /// Pointer moved to `(x, y)` in window coordinates.
    PointerMove { x: f32, y: f32 },
    /// Left button went up.
    PointerRelease,
    /// Framebuffer size changed.
    Resize { width: u32, height: u32 },
}

/// Buffers window events as [`ViewerEvent`]s until the next frame drains them.
///
/// Button events from winit carry no position, so the queue keeps the last
/// cursor position and stamps it onto presses.
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: VecDeque<ViewerEvent>,
    cursor: Vec2,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a window event and queue it. Returns `true` if anything was queued.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        let translated = match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => Some(ViewerEvent::PointerPress {
                    x: self.cursor.x,
                    y: self.cursor.y,
                }),
                ElementState::Released => Some(ViewerEvent::PointerRelease),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                Some(ViewerEvent::PointerMove {
                    x: self.cursor.x,
                    y: self.cursor.y,
                })
            }
            WindowEvent::Resized(size) => Some(ViewerEvent::Resize {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        };

        if let Some(event) = translated {
            self.push(event);
            true
        } else {
            false
        }
    }

    /// Queue an already-translated event.
    pub fn push(&mut self, event: ViewerEvent) {
        self.pending.push_back(event);
    }

    /// Take every pending event in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = ViewerEvent> + '_ {
        self.pending.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};
    use winit::event::DeviceId;

    fn device() -> DeviceId {
        // SAFETY: the id is only compared, never handed back to winit.
        unsafe { DeviceId::dummy() }
    }

    fn cursor_moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    fn mouse(state: ElementState, button: MouseButton) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button,
        }
    }

    #[test]
    fn press_carries_last_cursor_position() {
        let mut queue = InputQueue::new();
        queue.handle_event(&cursor_moved(12.0, 34.0));
        queue.handle_event(&mouse(ElementState::Pressed, MouseButton::Left));
        queue.handle_event(&mouse(ElementState::Released, MouseButton::Left));

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(
            events,
            vec![
                ViewerEvent::PointerMove { x: 12.0, y: 34.0 },
                ViewerEvent::PointerPress { x: 12.0, y: 34.0 },
                ViewerEvent::PointerRelease,
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut queue = InputQueue::new();
        assert!(!queue.handle_event(&mouse(ElementState::Pressed, MouseButton::Right)));
        assert!(!queue.handle_event(&mouse(ElementState::Pressed, MouseButton::Middle)));
        assert!(queue.is_empty());
    }

    #[test]
    fn resize_is_translated() {
        let mut queue = InputQueue::new();
        queue.handle_event(&WindowEvent::Resized(PhysicalSize::new(640, 360)));
        assert_eq!(
            queue.drain().next(),
            Some(ViewerEvent::Resize {
                width: 640,
                height: 360
            })
        );
    }
}
