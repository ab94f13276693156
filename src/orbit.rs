//! Orbit-style camera controller.
//!
//! Converts pointer drag and wheel input into camera movement around a
//! fixed target, with damped deltas. The controller only steps while input
//! arrives — the frame loop does not pump it — so a released drag stops
//! instantly rather than gliding.
//!
//! Preset view actions teleport the camera and then (some of them) call
//! [`OrbitControls::sync`] so the controller's spherical state matches the
//! new position; presets that skip the sync leave the controller stale
//! until the next drag.

use glam::{Vec2, Vec3};
use winit::event::MouseButton;

use crate::camera::Camera;
use crate::input::Input;

/// A camera controller that orbits around a target point.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Ignore all input when false.
    pub enabled: bool,
    /// Damped delta application (always on in the viewer).
    pub damping: bool,
    /// Fraction of the pending delta applied per step.
    pub damping_factor: f32,
    /// Mouse drag sensitivity, radians per pixel.
    pub sensitivity: f32,
    /// Scroll zoom sensitivity, world units per line.
    pub zoom_sensitivity: f32,
    /// Distance limits from the target.
    pub min_distance: f32,
    pub max_distance: f32,

    distance: f32,
    azimuth: f32,
    elevation: f32,

    // Pending damped deltas; decay only while being applied.
    azimuth_delta: f32,
    elevation_delta: f32,
    zoom_delta: f32,
}

impl OrbitControls {
    /// Create a controller orbiting `target`. Call [`sync`](Self::sync)
    /// afterwards so the spherical state matches the camera.
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enabled: true,
            damping: true,
            damping_factor: 0.05,
            sensitivity: 0.005,
            zoom_sensitivity: 0.5,
            min_distance: 0.1,
            max_distance: 100.0,
            distance: 1.0,
            azimuth: 0.0,
            elevation: 0.0,
            azimuth_delta: 0.0,
            elevation_delta: 0.0,
            zoom_delta: 0.0,
        }
    }

    /// Current distance from the target.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Horizontal orbit angle in radians.
    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    /// Vertical orbit angle in radians.
    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    /// Feed this frame's pointer state into the controller.
    ///
    /// Moves the camera only when fresh drag or wheel input arrived this
    /// frame; `captured` suppresses everything (the debug panel owns the
    /// pointer while hovered or dragged).
    pub fn process(&mut self, input: &Input, camera: &mut Camera, captured: bool) {
        if !self.enabled || captured {
            return;
        }

        let mut had_input = false;

        if input.mouse_down(MouseButton::Left) {
            let delta = input.mouse_delta();
            if delta != Vec2::ZERO {
                self.rotate(delta);
                had_input = true;
            }
        }

        let scroll = input.scroll_delta();
        if scroll.y != 0.0 {
            self.zoom(scroll.y);
            had_input = true;
        }

        if had_input {
            self.apply(camera);
        }
    }

    /// Accumulate a drag delta in pixels.
    pub(crate) fn rotate(&mut self, delta: Vec2) {
        self.azimuth_delta -= delta.x * self.sensitivity;
        self.elevation_delta += delta.y * self.sensitivity;
    }

    /// Accumulate a wheel delta in lines.
    pub(crate) fn zoom(&mut self, lines: f32) {
        self.zoom_delta += lines * self.zoom_sensitivity;
    }

    /// Apply (a damped step of) the pending deltas and reposition the
    /// camera on its orbit sphere, aimed at the target.
    pub(crate) fn apply(&mut self, camera: &mut Camera) {
        let f = if self.damping {
            self.damping_factor
        } else {
            1.0
        };

        self.azimuth += self.azimuth_delta * f;
        self.elevation = (self.elevation + self.elevation_delta * f).clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );
        self.distance =
            (self.distance - self.zoom_delta * f).clamp(self.min_distance, self.max_distance);

        if self.damping {
            let keep = 1.0 - self.damping_factor;
            self.azimuth_delta *= keep;
            self.elevation_delta *= keep;
            self.zoom_delta *= keep;
        } else {
            self.azimuth_delta = 0.0;
            self.elevation_delta = 0.0;
            self.zoom_delta = 0.0;
        }

        camera.position = self.target + self.offset();
        camera.look_at(self.target);
    }

    /// Recompute the spherical state from the camera's current position and
    /// drop any pending deltas. Does not move the camera.
    pub fn sync(&mut self, camera: &Camera) {
        let offset = camera.position - self.target;
        self.distance = offset
            .length()
            .clamp(self.min_distance, self.max_distance);
        self.azimuth = offset.x.atan2(offset.z);
        self.elevation = (offset.y / self.distance).clamp(-1.0, 1.0).asin();
        self.azimuth_delta = 0.0;
        self.elevation_delta = 0.0;
        self.zoom_delta = 0.0;
    }

    /// Spherical-to-Cartesian offset from the target.
    fn offset(&self) -> Vec3 {
        Vec3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (OrbitControls, Camera) {
        let mut camera = Camera::new().at(Vec3::new(0.0, 0.75, 3.0));
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.75, 0.0));
        controls.sync(&camera);
        camera.look_at(controls.target);
        (controls, camera)
    }

    #[test]
    fn sync_recovers_spherical_state_from_camera() {
        let (controls, _) = rig();
        assert!((controls.distance() - 3.0).abs() < 1e-5);
        assert!(controls.azimuth().abs() < 1e-5);
        assert!(controls.elevation().abs() < 1e-5);
    }

    #[test]
    fn no_input_leaves_camera_untouched() {
        let (mut controls, mut camera) = rig();
        let before = camera.position;
        controls.process(&Input::new(), &mut camera, false);
        assert_eq!(camera.position, before);
    }

    #[test]
    fn capture_suppresses_drag() {
        let (mut controls, mut camera) = rig();
        let before = camera.position;
        controls.rotate(Vec2::new(50.0, 0.0));
        // Captured process must not apply even the already-pending delta.
        controls.process(&Input::new(), &mut camera, true);
        assert_eq!(camera.position, before);
    }

    #[test]
    fn drag_keeps_distance_to_target() {
        let (mut controls, mut camera) = rig();
        controls.rotate(Vec2::new(120.0, 40.0));
        controls.apply(&mut camera);

        let d = (camera.position - controls.target).length();
        assert!((d - 3.0).abs() < 1e-4);
        // And the camera faces the target afterwards.
        let expected = (controls.target - camera.position).normalize();
        assert!((camera.forward() - expected).length() < 1e-4);
    }

    #[test]
    fn damping_applies_only_a_fraction_per_step() {
        let (mut controls, mut camera) = rig();
        controls.rotate(Vec2::new(-100.0, 0.0));
        let pending = 100.0 * controls.sensitivity;

        controls.apply(&mut camera);
        let applied = controls.azimuth();
        assert!((applied - pending * controls.damping_factor).abs() < 1e-5);

        // The remainder stays pending and decays, not jumps.
        controls.apply(&mut camera);
        assert!(controls.azimuth() < pending);
    }

    #[test]
    fn zoom_clamps_to_distance_limits() {
        let (mut controls, mut camera) = rig();
        controls.damping = false;
        controls.zoom(-1000.0);
        controls.apply(&mut camera);
        assert!((controls.distance() - controls.max_distance).abs() < 1e-4);

        controls.zoom(10_000.0);
        controls.apply(&mut camera);
        assert!((controls.distance() - controls.min_distance).abs() < 1e-4);
    }

    #[test]
    fn sync_clears_pending_deltas() {
        let (mut controls, camera) = rig();
        controls.rotate(Vec2::new(30.0, 30.0));
        controls.sync(&camera);

        let mut moved = camera;
        controls.apply(&mut moved);
        // With no pending deltas the apply is a pure reposition onto the
        // same orbit point.
        assert!((moved.position - camera.position).length() < 1e-4);
    }
}
