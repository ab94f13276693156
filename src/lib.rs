//! # Toolroom
//!
//! **A small wgpu viewer for a benchtop CNC mill model.**
//!
//! Opens a window, drops a ground plane and two lights into the scene,
//! loads the machine model in the background, and lets you orbit around it
//! with the mouse. A debug panel in the corner exposes the camera's raw
//! position/rotation fields plus the preset views used for framing shots
//! of the machine (spindle, bed, control panel, and so on).
//!
//! ```no_run
//! use toolroom::{AppConfig, run};
//!
//! fn main() {
//!     env_logger::init();
//!     run(AppConfig::new().title("Toolroom").size(1280, 720));
//! }
//! ```
//!
//! Run with `RUST_LOG=toolroom=debug` to get the per-frame camera pose dump
//! that the preset coordinates were originally read from.

mod app;
mod camera;
mod draw2d;
mod font;
mod geometry;
mod gpu;
mod input;
mod mesh;
mod mesh_pass;
mod model;
mod orbit;
mod panel;
mod presets;
mod scene;
mod shadow;

pub use app::{AppConfig, MODEL_PATH, run};
pub use camera::Camera;
pub use draw2d::{Color, Draw2d};
pub use font::{FontAtlas, FontError};
pub use geometry::{GeometryError, Primitive, RawGeometry, load_model};
pub use gpu::GpuContext;
pub use input::Input;
pub use mesh::{Mesh, Transform, Vertex3d};
pub use mesh_pass::{DrawCall, LightingInfo, MeshPass};
pub use model::ModelLoad;
pub use orbit::OrbitControls;
pub use panel::{DebugPanel, SLIDER_MAX, SLIDER_MIN, SLIDER_STEP};
pub use presets::ViewPreset;
pub use scene::{
    AmbientLight, DirectionalLight, FLOOR_COLOR, FLOOR_HEIGHT, FLOOR_SIZE, LoadedModel, Scene,
    ShadowProjection,
};
pub use shadow::ShadowPass;

// Re-export glam math types for convenience.
pub use glam::{Mat4, Quat, Vec2, Vec3};
