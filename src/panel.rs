//! Debug panel: camera sliders and preset view buttons.
//!
//! A small immediate-mode widget column in the top-right corner, drawn with
//! [`Draw2d`]. Six sliders are two-way bound to the camera's position and
//! rotation fields; six buttons fire the preset views. The panel owns the
//! pointer while hovered or mid-drag so panel interaction never orbits the
//! camera underneath it.

use glam::Vec2;
use winit::event::MouseButton;

use crate::camera::Camera;
use crate::draw2d::{Color, Draw2d};
use crate::input::Input;
use crate::presets::ViewPreset;

/// Slider range lower bound.
pub const SLIDER_MIN: f32 = -5.0;
/// Slider range upper bound.
pub const SLIDER_MAX: f32 = 5.0;
/// Slider quantization step.
pub const SLIDER_STEP: f32 = 0.1;

const PANEL_WIDTH: f32 = 260.0;
const MARGIN: f32 = 10.0;
const PADDING: f32 = 6.0;
const TITLE_HEIGHT: f32 = 24.0;
const ROW_HEIGHT: f32 = 24.0;
const ROW_GAP: f32 = 2.0;
const LABEL_WIDTH: f32 = 58.0;
const VALUE_WIDTH: f32 = 48.0;
const HANDLE_WIDTH: f32 = 8.0;

const SLIDER_LABELS: [&str; 6] = ["pos x", "pos y", "pos z", "rot x", "rot y", "rot z"];

#[derive(Clone, Copy, Debug)]
struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Rect {
    fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// Widget rectangles for the current viewport size.
struct Layout {
    panel: Rect,
}

impl Layout {
    fn new(viewport: Vec2) -> Self {
        let rows = SLIDER_LABELS.len() + ViewPreset::ALL.len();
        let height =
            TITLE_HEIGHT + rows as f32 * (ROW_HEIGHT + ROW_GAP) + PADDING;
        Self {
            panel: Rect {
                x: viewport.x - PANEL_WIDTH - MARGIN,
                y: MARGIN,
                w: PANEL_WIDTH,
                h: height,
            },
        }
    }

    fn row(&self, index: usize) -> Rect {
        Rect {
            x: self.panel.x + PADDING,
            y: self.panel.y + TITLE_HEIGHT + index as f32 * (ROW_HEIGHT + ROW_GAP),
            w: self.panel.w - 2.0 * PADDING,
            h: ROW_HEIGHT,
        }
    }

    /// Slider track area inside slider row `index` (0..6).
    fn track(&self, index: usize) -> Rect {
        let row = self.row(index);
        Rect {
            x: row.x + LABEL_WIDTH,
            y: row.y,
            w: row.w - LABEL_WIDTH - VALUE_WIDTH - PADDING,
            h: row.h,
        }
    }

    /// Button area for preset `index` (0..6), laid out after the sliders.
    fn button(&self, index: usize) -> Rect {
        self.row(SLIDER_LABELS.len() + index)
    }
}

/// Map a cursor x position on a track to a clamped, quantized value.
fn slider_value_from_position(mouse_x: f32, track: Rect) -> f32 {
    let span = (track.w - HANDLE_WIDTH).max(1.0);
    let t = ((mouse_x - track.x - HANDLE_WIDTH * 0.5) / span).clamp(0.0, 1.0);
    quantize(SLIDER_MIN + t * (SLIDER_MAX - SLIDER_MIN))
}

/// Snap a value to the slider's step and clamp it into range.
fn quantize(value: f32) -> f32 {
    let stepped = SLIDER_MIN + ((value - SLIDER_MIN) / SLIDER_STEP).round() * SLIDER_STEP;
    stepped.clamp(SLIDER_MIN, SLIDER_MAX)
}

/// Normalized handle position for display. Out-of-range values pin the
/// handle to the end without touching the bound field.
fn slider_display_t(value: f32) -> f32 {
    ((value - SLIDER_MIN) / (SLIDER_MAX - SLIDER_MIN)).clamp(0.0, 1.0)
}

/// Read the camera field bound to slider `index`.
fn field(camera: &Camera, index: usize) -> f32 {
    match index {
        0 => camera.position.x,
        1 => camera.position.y,
        2 => camera.position.z,
        3 => camera.rotation.x,
        4 => camera.rotation.y,
        _ => camera.rotation.z,
    }
}

/// Write the camera field bound to slider `index`.
fn set_field(camera: &mut Camera, index: usize, value: f32) {
    match index {
        0 => camera.position.x = value,
        1 => camera.position.y = value,
        2 => camera.position.z = value,
        3 => camera.rotation.x = value,
        4 => camera.rotation.y = value,
        _ => camera.rotation.z = value,
    }
}

/// The debug panel's interaction state.
pub struct DebugPanel {
    active_slider: Option<usize>,
    hovered: bool,
    mouse: Vec2,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self {
            active_slider: None,
            hovered: false,
            mouse: Vec2::ZERO,
        }
    }

    /// True while the panel owns the pointer (hovered or dragging a
    /// slider); orbit input is suppressed then.
    pub fn captures(&self) -> bool {
        self.hovered || self.active_slider.is_some()
    }

    /// Process this frame's input against the panel widgets.
    ///
    /// Slider drags write straight into the camera; a button hit returns
    /// the preset to apply.
    pub fn update(
        &mut self,
        input: &Input,
        camera: &mut Camera,
        viewport: Vec2,
    ) -> Option<ViewPreset> {
        let layout = Layout::new(viewport);
        self.mouse = input.mouse_position();
        self.hovered = layout.panel.contains(self.mouse);

        let mut clicked = None;

        if input.mouse_pressed(MouseButton::Left) && self.hovered {
            for index in 0..SLIDER_LABELS.len() {
                if layout.track(index).contains(self.mouse) {
                    self.active_slider = Some(index);
                }
            }
            for (index, preset) in ViewPreset::ALL.iter().enumerate() {
                if layout.button(index).contains(self.mouse) {
                    clicked = Some(*preset);
                }
            }
        }

        if let Some(index) = self.active_slider {
            if input.mouse_down(MouseButton::Left) {
                let value = slider_value_from_position(self.mouse.x, layout.track(index));
                set_field(camera, index, value);
            } else {
                self.active_slider = None;
            }
        }

        clicked
    }

    /// Queue the panel's geometry and labels for this frame.
    pub fn draw(&self, draw: &mut Draw2d, camera: &Camera, viewport: Vec2) {
        let layout = Layout::new(viewport);
        let panel = layout.panel;

        draw.rect(panel.x, panel.y, panel.w, panel.h, Color::PANEL_BG);
        draw.text(panel.x + PADDING, panel.y + 4.0, "Controls", Color::WHITE);

        for (index, label) in SLIDER_LABELS.iter().enumerate() {
            let row = layout.row(index);
            let track = layout.track(index);
            let value = field(camera, index);

            draw.text(row.x, row.y + 4.0, label, Color::LABEL);

            draw.rect(track.x, track.y + 4.0, track.w, track.h - 8.0, Color::WIDGET_BG);

            let t = slider_display_t(value);
            let fill_w = t * (track.w - HANDLE_WIDTH);
            draw.rect(track.x, track.y + 4.0, fill_w, track.h - 8.0, Color::ACCENT);

            let handle_color = if self.active_slider == Some(index) {
                Color::ACCENT_HOVER
            } else {
                Color::WHITE
            };
            draw.rect(
                track.x + fill_w,
                track.y + 2.0,
                HANDLE_WIDTH,
                track.h - 4.0,
                handle_color,
            );

            let value_text = format!("{:.1}", value);
            let text_w = draw.font().map_or(0.0, |f| f.measure(&value_text));
            draw.text(
                row.x + row.w - text_w,
                row.y + 4.0,
                &value_text,
                Color::LABEL,
            );
        }

        for (index, preset) in ViewPreset::ALL.iter().enumerate() {
            let button = layout.button(index);
            let color = if button.contains(self.mouse) {
                Color::ACCENT_HOVER
            } else {
                Color::WIDGET_BG
            };
            draw.rect(button.x, button.y, button.w, button.h, color);
            draw.text(button.x + PADDING, button.y + 4.0, preset.label(), Color::WHITE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use winit::event::ElementState;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn press_at(input: &mut Input, p: Vec2) {
        input.on_cursor_moved(p);
        input.on_button(MouseButton::Left, ElementState::Pressed);
    }

    fn track_point(index: usize, t: f32) -> Vec2 {
        let track = Layout::new(VIEWPORT).track(index);
        Vec2::new(
            track.x + HANDLE_WIDTH * 0.5 + t * (track.w - HANDLE_WIDTH),
            track.y + track.h * 0.5,
        )
    }

    #[test]
    fn quantize_snaps_to_tenths() {
        assert!((quantize(0.24) - 0.2).abs() < 1e-5);
        assert!((quantize(0.26) - 0.3).abs() < 1e-5);
        assert!((quantize(-1.333) + 1.3).abs() < 1e-5);
    }

    #[test]
    fn quantize_clamps_to_range() {
        assert_eq!(quantize(17.0), SLIDER_MAX);
        assert_eq!(quantize(-17.0), SLIDER_MIN);
    }

    #[test]
    fn track_endpoints_hit_range_bounds() {
        let track = Layout::new(VIEWPORT).track(0);
        assert_eq!(slider_value_from_position(track.x - 100.0, track), SLIDER_MIN);
        assert_eq!(
            slider_value_from_position(track.x + track.w + 100.0, track),
            SLIDER_MAX
        );
    }

    #[test]
    fn dragging_a_slider_writes_the_camera_field() {
        let mut panel = DebugPanel::new();
        let mut camera = Camera::new();
        let mut input = Input::new();

        press_at(&mut input, track_point(0, 1.0));
        panel.update(&input, &mut camera, VIEWPORT);

        assert_eq!(camera.position.x, SLIDER_MAX);
        assert!(panel.captures());
    }

    #[test]
    fn slider_values_quantize_while_dragging() {
        let mut panel = DebugPanel::new();
        let mut camera = Camera::new();
        let mut input = Input::new();

        press_at(&mut input, track_point(4, 0.5));
        panel.update(&input, &mut camera, VIEWPORT);

        let remainder = ((camera.rotation.y - SLIDER_MIN) / SLIDER_STEP).fract().abs();
        assert!(remainder < 1e-3 || (remainder - 1.0).abs() < 1e-3);
    }

    #[test]
    fn release_ends_the_drag_and_capture() {
        let mut panel = DebugPanel::new();
        let mut camera = Camera::new();
        let mut input = Input::new();

        press_at(&mut input, track_point(2, 0.5));
        panel.update(&input, &mut camera, VIEWPORT);
        assert!(panel.captures());

        input.begin_frame();
        input.on_button(MouseButton::Left, ElementState::Released);
        // Move the cursor off the panel so hover capture ends too.
        input.on_cursor_moved(Vec2::new(50.0, 50.0));
        panel.update(&input, &mut camera, VIEWPORT);
        assert!(!panel.captures());
    }

    #[test]
    fn button_press_reports_its_preset() {
        let mut panel = DebugPanel::new();
        let mut camera = Camera::new();
        let mut input = Input::new();

        let button = Layout::new(VIEWPORT).button(2); // "centered"
        press_at(
            &mut input,
            Vec2::new(button.x + button.w * 0.5, button.y + button.h * 0.5),
        );
        let clicked = panel.update(&input, &mut camera, VIEWPORT);
        assert_eq!(clicked, Some(ViewPreset::Centered));
    }

    #[test]
    fn programmatic_out_of_range_values_are_not_reclamped() {
        let mut panel = DebugPanel::new();
        let mut camera = Camera::new();
        camera.position = Vec3::new(9.7, 0.0, 0.0);

        // No pointer interaction this frame: the panel must not touch the
        // field even though its slider can only display up to 5.0.
        let input = Input::new();
        panel.update(&input, &mut camera, VIEWPORT);
        assert_eq!(camera.position.x, 9.7);
        assert_eq!(slider_display_t(camera.position.x), 1.0);
    }

    #[test]
    fn clicks_outside_the_panel_do_nothing() {
        let mut panel = DebugPanel::new();
        let mut camera = Camera::new();
        let before = camera.position;
        let mut input = Input::new();

        press_at(&mut input, Vec2::new(20.0, 20.0));
        let clicked = panel.update(&input, &mut camera, VIEWPORT);

        assert_eq!(clicked, None);
        assert_eq!(camera.position, before);
        assert!(!panel.captures());
    }
}
