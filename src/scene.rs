//! Scene contents: ground plane, lights, and the (eventually) loaded model.
//!
//! Everything here is created once at startup. The one late mutation is
//! [`Scene::attach_model`], called when the background load delivers.

use glam::{Mat4, Vec3};

use crate::geometry::Primitive;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Transform};

/// Ground plane side length in world units.
pub const FLOOR_SIZE: f32 = 10.0;
/// Vertical offset of the ground plane below the origin.
pub const FLOOR_HEIGHT: f32 = -0.63;
/// Mid-grey floor color (#444444).
pub const FLOOR_COLOR: [f32; 4] = [0.267, 0.267, 0.267, 1.0];

/// Uniform, non-directional illumination.
#[derive(Clone, Copy, Debug)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

/// Parallel-ray light simulating a distant source, with an orthographic
/// shadow frustum.
#[derive(Clone, Copy, Debug)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Light position; rays travel from here toward the origin.
    pub position: Vec3,
    pub shadow: ShadowProjection,
}

/// Orthographic shadow frustum parameters.
#[derive(Clone, Copy, Debug)]
pub struct ShadowProjection {
    /// Half-extent of the frustum, horizontally and vertically.
    pub extent: f32,
    pub near: f32,
    pub far: f32,
    /// Shadow map resolution (square).
    pub map_size: u32,
}

impl DirectionalLight {
    /// Unit direction the rays travel along.
    pub fn direction(&self) -> Vec3 {
        (-self.position).normalize_or(Vec3::NEG_Y)
    }

    /// World-to-shadow-clip transform for the shadow pass.
    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::orthographic_rh(
            -self.shadow.extent,
            self.shadow.extent,
            -self.shadow.extent,
            self.shadow.extent,
            self.shadow.near,
            self.shadow.far,
        );
        proj * view
    }
}

/// One uploaded chunk of the model: GPU mesh plus material base color.
pub struct GpuPrimitive {
    pub mesh: Mesh,
    pub base_color: [f32; 4],
}

/// The loaded model, uploaded to the GPU.
pub struct LoadedModel {
    pub primitives: Vec<GpuPrimitive>,
}

impl LoadedModel {
    /// Upload parsed primitives to GPU buffers.
    pub fn upload(gpu: &GpuContext, primitives: Vec<Primitive>) -> Self {
        let primitives = primitives
            .into_iter()
            .map(|p| GpuPrimitive {
                mesh: Mesh::new(gpu, &p.geometry.vertices, &p.geometry.indices),
                base_color: p.base_color,
            })
            .collect();
        Self { primitives }
    }
}

/// All visual entities the viewer renders.
pub struct Scene {
    pub floor: Mesh,
    pub floor_transform: Transform,
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    /// Absent until the background load completes.
    pub model: Option<LoadedModel>,
    /// The model sits at the transform its glTF node carried (already baked
    /// into the vertices), so it renders at identity.
    pub model_transform: Transform,
}

impl Scene {
    /// Build the static scene: floor and both lights.
    pub fn new(gpu: &GpuContext) -> Self {
        Self {
            floor: Mesh::plane(gpu, FLOOR_SIZE),
            floor_transform: Transform::from_position(Vec3::new(0.0, FLOOR_HEIGHT, 0.0)),
            ambient: AmbientLight {
                color: Vec3::ONE,
                intensity: 2.4,
            },
            sun: DirectionalLight {
                color: Vec3::ONE,
                intensity: 1.8,
                position: Vec3::new(5.0, 5.0, 5.0),
                shadow: ShadowProjection {
                    extent: 7.0,
                    near: 0.5,
                    far: 15.0,
                    map_size: 1024,
                },
            },
            model: None,
            model_transform: Transform::new(),
        }
    }

    /// Insert the loaded model. Happens at most once; a second call is
    /// ignored since the load runs only at startup.
    pub fn attach_model(&mut self, model: LoadedModel) {
        if self.model.is_none() {
            self.model = Some(model);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_sun() -> DirectionalLight {
        DirectionalLight {
            color: Vec3::ONE,
            intensity: 1.8,
            position: Vec3::new(5.0, 5.0, 5.0),
            shadow: ShadowProjection {
                extent: 7.0,
                near: 0.5,
                far: 15.0,
                map_size: 1024,
            },
        }
    }

    #[test]
    fn sun_direction_points_at_origin() {
        let sun = test_sun();
        let dir = sun.direction();
        assert!((dir.length() - 1.0).abs() < 1e-5);
        // From (5,5,5) toward the origin.
        assert!((dir - Vec3::splat(-1.0 / 3f32.sqrt())).length() < 1e-5);
    }

    #[test]
    fn shadow_frustum_contains_origin() {
        let sun = test_sun();
        let clip = sun.view_proj() * Vec3::ZERO.extend(1.0);
        let ndc = clip / clip.w;

        assert!(ndc.x.abs() < 1e-3);
        assert!(ndc.y.abs() < 1e-3);
        // wgpu depth range is [0, 1]; the origin sits between near and far.
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn shadow_frustum_clips_beyond_far_plane() {
        let sun = test_sun();
        // 16 units past the light along the ray direction is beyond far=15.
        let p = sun.position + sun.direction() * 16.0;
        let clip = sun.view_proj() * p.extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.z > 1.0);
    }

    #[test]
    fn shadow_frustum_edges_map_to_ndc_edges() {
        let sun = test_sun();
        let view = Mat4::look_at_rh(sun.position, Vec3::ZERO, Vec3::Y);
        // A point 7 units along the light's right axis sits on the frustum
        // boundary, which is x = 1 in NDC.
        let right = view.inverse().transform_vector3(Vec3::X);
        let p = sun.position + sun.direction() * 5.0 + right * 7.0;
        let clip = sun.view_proj() * p.extend(1.0);
        let ndc = clip / clip.w;
        assert!((ndc.x - 1.0).abs() < 1e-3);
    }
}
