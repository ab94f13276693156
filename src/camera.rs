//! Perspective camera with mutable position and Euler orientation.
//!
//! The camera is a plain mutable record: the orbit controller, the preset
//! actions, and the debug panel sliders all write `position` and `rotation`
//! directly. The render pass reads the matrices back out each frame.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// A perspective camera.
///
/// `rotation` holds XYZ Euler angles in radians; the camera's world
/// transform is translation followed by that rotation, and the view matrix
/// is its inverse.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    /// Orientation as XYZ Euler angles, radians.
    pub rotation: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Vec3::ZERO,
            fov: 75f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting position.
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    /// Set the clip planes.
    pub fn with_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Recompute the aspect ratio for a new viewport size.
    ///
    /// Must be called on every resize so that `aspect` always equals
    /// width / height.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Orientation as a quaternion.
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Unit vector the camera is facing along (local -Z).
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// Point the camera at a target, overwriting `rotation`.
    pub fn look_at(&mut self, target: Vec3) {
        let view = Mat4::look_at_rh(self.position, target, Vec3::Y);
        // The camera's world orientation is the inverse of the view rotation.
        let world = view.inverse();
        let (_, rot, _) = world.to_scale_rotation_translation();
        let (x, y, z) = rot.to_euler(EulerRot::XYZ);
        self.rotation = Vec3::new(x, y, z);
    }

    /// World-to-camera transform.
    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * Mat4::from_quat(self.orientation())).inverse()
    }

    /// Camera-to-clip transform for the current aspect ratio.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn aspect_tracks_viewport() {
        let mut camera = Camera::new();
        camera.set_aspect(1280, 720);
        assert!(approx(camera.aspect, 1280.0 / 720.0));

        camera.set_aspect(640, 640);
        assert!(approx(camera.aspect, 1.0));
    }

    #[test]
    fn aspect_ignores_degenerate_viewport() {
        let mut camera = Camera::new();
        camera.set_aspect(1280, 720);
        camera.set_aspect(0, 720);
        assert!(approx(camera.aspect, 1280.0 / 720.0));
    }

    #[test]
    fn identity_rotation_faces_negative_z() {
        let camera = Camera::new();
        let fwd = camera.forward();
        assert!(approx(fwd.x, 0.0));
        assert!(approx(fwd.y, 0.0));
        assert!(approx(fwd.z, -1.0));
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera.rotation = Vec3::ZERO;

        let p = camera.view_matrix().transform_point3(Vec3::ZERO);
        // Origin should land 5 units in front of the camera.
        assert!(approx(p.z, -5.0));
        assert!(approx(p.x, 0.0));
        assert!(approx(p.y, 0.0));
    }

    #[test]
    fn look_at_faces_target() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(3.0, 1.0, 3.0);
        camera.look_at(Vec3::new(0.0, 1.0, 0.0));

        let expected = (Vec3::new(0.0, 1.0, 0.0) - camera.position).normalize();
        let fwd = camera.forward();
        assert!((fwd - expected).length() < 1e-4);
    }

    #[test]
    fn projection_uses_current_aspect() {
        let mut camera = Camera::new();
        camera.set_aspect(200, 100);
        let proj = camera.projection_matrix();
        // col(1).y / col(0).x == aspect for a perspective matrix.
        let ratio = proj.col(1).y / proj.col(0).x;
        assert!(approx(ratio, 2.0));
    }
}
