//! Pointer state for hover and click interactions.
//!
//! Hosts feed [`PointerEvent`]s in device pixels. With the `winit` feature
//! enabled, [`Pointer::handle_window_event`] translates raw window events.
//!
//! ```ignore
//! sim.handle_pointer(PointerEvent::Moved { x: 120.0, y: 48.0 });
//! sim.handle_pointer(PointerEvent::Clicked { x: 120.0, y: 48.0 });
//! sim.handle_pointer(PointerEvent::Left);
//! ```

use glam::Vec2;

#[cfg(feature = "winit")]
use winit::event::{ElementState, MouseButton, WindowEvent};

/// A pointer event, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Moved { x: f32, y: f32 },
    /// The pointer left the canvas.
    Left,
    Clicked { x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerStatus {
    /// No pointer event seen yet.
    #[default]
    Idle,
    Moving,
    Left,
}

/// Last known pointer state.
#[derive(Debug, Clone, Default)]
pub struct Pointer {
    /// Current position, `None` when outside the canvas.
    pub position: Option<Vec2>,
    pub status: PointerStatus,
    pub click_position: Option<Vec2>,
    /// Simulation time of the last click, in seconds.
    pub click_time: Option<f32>,
}

impl Pointer {
    /// Apply an event that has already been scaled to canvas pixels.
    pub fn apply(&mut self, event: PointerEvent, now: f32) {
        match event {
            PointerEvent::Moved { x, y } => {
                self.position = Some(Vec2::new(x, y));
                self.status = PointerStatus::Moving;
            }
            PointerEvent::Left => {
                self.position = None;
                self.status = PointerStatus::Left;
            }
            PointerEvent::Clicked { x, y } => {
                let at = Vec2::new(x, y);
                self.click_position = Some(at);
                self.click_time = Some(now);
                if self.position.is_none() {
                    self.position = Some(at);
                }
            }
        }
    }

    /// Position while the pointer is moving over the canvas.
    #[inline]
    pub fn hover_position(&self) -> Option<Vec2> {
        match self.status {
            PointerStatus::Moving => self.position,
            _ => None,
        }
    }

    /// Translate a winit window event, using the last seen cursor position
    /// for clicks.
    #[cfg(feature = "winit")]
    pub fn handle_window_event(&self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => Some(PointerEvent::Moved {
                x: position.x as f32,
                y: position.y as f32,
            }),
            WindowEvent::CursorLeft { .. } => Some(PointerEvent::Left),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.position.map(|p| PointerEvent::Clicked { x: p.x, y: p.y }),
            _ => None,
        }
    }
}

/// Progress of the click-triggered bubble and repulse effects.
#[derive(Debug, Clone, Default)]
pub struct ClickState {
    /// A click bubble is animating.
    pub bubble_clicking: bool,
    /// The bubble reached its peak and is easing back.
    pub bubble_duration_end: bool,
    /// A click repulse pass is active.
    pub repulse_clicking: bool,
    /// Every particle has been repulsed once in the current pass.
    pub repulse_finish: bool,
    /// Particles repulsed in the current pass.
    pub repulse_count: usize,
}

/// Pointer plus the effect state it drives.
#[derive(Debug, Clone, Default)]
pub struct Interactivity {
    pub pointer: Pointer,
    pub click: ClickState,
}

impl Interactivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget pointer and click effects.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
