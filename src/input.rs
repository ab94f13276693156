use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};

/// Tracks pointer state across a frame.
///
/// The viewer is mouse-driven: orbit drags, wheel zoom, and the debug panel
/// all read from here. Per-frame deltas are cleared by [`Input::begin_frame`]
/// at the end of each tick.
pub struct Input {
    buttons_down: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    buttons_released: HashSet<MouseButton>,
    mouse_position: Vec2,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            buttons_down: HashSet::new(),
            buttons_pressed: HashSet::new(),
            buttons_released: HashSet::new(),
            mouse_position: Vec2::ZERO,
            mouse_delta: Vec2::ZERO,
            scroll_delta: Vec2::ZERO,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame state. Call once per frame after input consumers ran.
    pub fn begin_frame(&mut self) {
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Process a window event and update pointer state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.on_button(*button, *state);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    winit::event::MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    winit::event::MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
                self.on_scroll(d);
            }
            _ => {}
        }
    }

    pub(crate) fn on_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.buttons_down.contains(&button) {
                    self.buttons_pressed.insert(button);
                }
                self.buttons_down.insert(button);
            }
            ElementState::Released => {
                self.buttons_down.remove(&button);
                self.buttons_released.insert(button);
            }
        }
    }

    pub(crate) fn on_cursor_moved(&mut self, new_pos: Vec2) {
        self.mouse_delta += new_pos - self.mouse_position;
        self.mouse_position = new_pos;
    }

    pub(crate) fn on_scroll(&mut self, delta: Vec2) {
        self.scroll_delta += delta;
    }

    /// True while the button is held.
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// True on the frame the button went down.
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    /// True on the frame the button came up.
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }

    /// Cursor position in window coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Cursor movement since last frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Wheel movement since last frame, in lines.
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_moves_accumulate_into_delta() {
        let mut input = Input::new();
        input.on_cursor_moved(Vec2::new(10.0, 10.0));
        input.on_cursor_moved(Vec2::new(14.0, 7.0));

        assert_eq!(input.mouse_position(), Vec2::new(14.0, 7.0));
        assert_eq!(input.mouse_delta(), Vec2::new(14.0, 7.0));

        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        input.on_cursor_moved(Vec2::new(15.0, 7.0));
        assert_eq!(input.mouse_delta(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn press_edge_lasts_one_frame() {
        let mut input = Input::new();
        input.on_button(MouseButton::Left, ElementState::Pressed);

        assert!(input.mouse_pressed(MouseButton::Left));
        assert!(input.mouse_down(MouseButton::Left));

        input.begin_frame();
        assert!(!input.mouse_pressed(MouseButton::Left));
        assert!(input.mouse_down(MouseButton::Left));

        input.on_button(MouseButton::Left, ElementState::Released);
        assert!(!input.mouse_down(MouseButton::Left));
        assert!(input.mouse_released(MouseButton::Left));
    }

    #[test]
    fn scroll_accumulates_within_a_frame() {
        let mut input = Input::new();
        input.on_scroll(Vec2::new(0.0, 1.0));
        input.on_scroll(Vec2::new(0.0, 0.5));
        assert_eq!(input.scroll_delta(), Vec2::new(0.0, 1.5));

        input.begin_frame();
        assert_eq!(input.scroll_delta(), Vec2::ZERO);
    }
}
