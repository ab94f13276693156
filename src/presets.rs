//! Preset camera views.
//!
//! Each preset teleports the camera to a hand-picked placement around the
//! machine (coordinates were read off the camera pose log while framing
//! shots by hand). A preset overwrites position and rotation wholesale;
//! three of them additionally resync the orbit controller to the new
//! position, the other three leave it for the next drag to fix up.

use glam::Vec3;

use crate::camera::Camera;
use crate::orbit::OrbitControls;

/// A named camera placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewPreset {
    OnButton,
    Display,
    Centered,
    Spindle,
    Bed,
    ManualControls,
}

impl ViewPreset {
    /// Every preset, in panel order.
    pub const ALL: [ViewPreset; 6] = [
        ViewPreset::OnButton,
        ViewPreset::Display,
        ViewPreset::Centered,
        ViewPreset::Spindle,
        ViewPreset::Bed,
        ViewPreset::ManualControls,
    ];

    /// Button label in the debug panel.
    pub fn label(&self) -> &'static str {
        match self {
            ViewPreset::OnButton => "onButton",
            ViewPreset::Display => "display",
            ViewPreset::Centered => "centered",
            ViewPreset::Spindle => "spindle",
            ViewPreset::Bed => "bed",
            ViewPreset::ManualControls => "manualControls",
        }
    }

    /// The literal (position, rotation) pair this preset applies.
    pub fn placement(&self) -> (Vec3, Vec3) {
        match self {
            ViewPreset::OnButton => (Vec3::new(1.796, 0.593, 0.604), Vec3::new(0.0, 1.6, 0.0)),
            ViewPreset::Display => (
                Vec3::new(0.523, 0.544, 1.805),
                Vec3::new(0.033, -0.495, 0.016),
            ),
            ViewPreset::Centered => (Vec3::new(-0.003, 0.762, 3.0), Vec3::ZERO),
            ViewPreset::Spindle => (Vec3::new(0.009, 0.791, 0.713), Vec3::ZERO),
            ViewPreset::Bed => (
                Vec3::new(-0.023, 1.109, 1.530),
                Vec3::new(-0.549, 0.042, 0.025),
            ),
            ViewPreset::ManualControls => (Vec3::new(0.512, 0.723, 1.707), Vec3::ZERO),
        }
    }

    /// Whether applying this preset also resyncs the orbit controller.
    ///
    /// Mirrors how the placements were captured: the remaining presets rely
    /// on the next drag to refresh the controller.
    pub fn resyncs_controls(&self) -> bool {
        matches!(
            self,
            ViewPreset::OnButton | ViewPreset::Centered | ViewPreset::Spindle
        )
    }

    /// Overwrite the camera with this preset's placement.
    pub fn apply(&self, camera: &mut Camera, controls: &mut OrbitControls) {
        let (position, rotation) = self.placement();
        camera.position = position;
        camera.rotation = rotation;

        if self.resyncs_controls() {
            controls.sync(camera);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (Camera, OrbitControls) {
        let camera = Camera::new().at(Vec3::new(-0.003, 0.762, 3.0));
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.75, 0.0));
        controls.sync(&camera);
        (camera, controls)
    }

    #[test]
    fn centered_always_restores_its_placement() {
        let (mut camera, mut controls) = rig();
        // Scramble the camera first; the preset must win regardless.
        camera.position = Vec3::new(4.2, -1.0, 0.3);
        camera.rotation = Vec3::new(1.0, 2.0, 3.0);

        ViewPreset::Centered.apply(&mut camera, &mut controls);
        assert_eq!(camera.position, Vec3::new(-0.003, 0.762, 3.0));
        assert_eq!(camera.rotation, Vec3::ZERO);
    }

    #[test]
    fn bed_always_restores_its_placement() {
        let (mut camera, mut controls) = rig();
        camera.position = Vec3::splat(-3.0);

        ViewPreset::Bed.apply(&mut camera, &mut controls);
        assert_eq!(camera.position, Vec3::new(-0.023, 1.109, 1.530));
        assert_eq!(camera.rotation, Vec3::new(-0.549, 0.042, 0.025));
    }

    #[test]
    fn resync_split_matches_capture_notes() {
        let synced: Vec<_> = ViewPreset::ALL
            .iter()
            .filter(|p| p.resyncs_controls())
            .collect();
        assert_eq!(
            synced,
            vec![
                &ViewPreset::OnButton,
                &ViewPreset::Centered,
                &ViewPreset::Spindle
            ]
        );
    }

    #[test]
    fn syncing_presets_update_controller_distance() {
        let (mut camera, mut controls) = rig();
        ViewPreset::OnButton.apply(&mut camera, &mut controls);

        let expected = (camera.position - controls.target).length();
        assert!((controls.distance() - expected).abs() < 1e-5);
    }

    #[test]
    fn non_syncing_presets_leave_controller_stale() {
        let (mut camera, mut controls) = rig();
        let before = controls.distance();

        ViewPreset::Bed.apply(&mut camera, &mut controls);
        assert_eq!(controls.distance(), before);
    }

    #[test]
    fn presets_never_mutate_rotation_after_apply() {
        // The sync path must not re-aim the camera: the literal rotation is
        // the preset's observable contract.
        let (mut camera, mut controls) = rig();
        ViewPreset::Spindle.apply(&mut camera, &mut controls);
        assert_eq!(camera.rotation, Vec3::ZERO);
    }
}
