//! Application shell: window, event dispatch, and the frame loop.
//!
//! All mutable state lives in one [`Viewer`] owned by the winit application
//! handler; there are no module-level singletons. Each frame polls the
//! model load, feeds input through the panel and then the orbit controls,
//! and records the shadow, mesh, and overlay passes.

use std::path::PathBuf;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::draw2d::Draw2d;
use crate::font::FontAtlas;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::mesh_pass::{DrawCall, LightingInfo, MeshPass};
use crate::model::ModelLoad;
use crate::orbit::OrbitControls;
use crate::panel::DebugPanel;
use crate::scene::{FLOOR_COLOR, LoadedModel, Scene};
use crate::shadow::ShadowPass;

/// Default model asset location, relative to the working directory.
pub const MODEL_PATH: &str = "assets/models/tormach.gltf";

/// Surface pixel density is capped here even on denser displays.
const MAX_PIXEL_RATIO: f64 = 2.0;

const PANEL_FONT_SIZE: f32 = 14.0;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.004,
    g: 0.004,
    b: 0.006,
    a: 1.0,
};

/// Window and asset configuration.
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub model_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Toolroom".to_string(),
            width: 1280,
            height: 720,
            model_path: PathBuf::from(MODEL_PATH),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }
}

/// Run the viewer until the window closes.
pub fn run(config: AppConfig) {
    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::Pending { config };
    event_loop.run_app(&mut app).unwrap();
}

enum App {
    Pending { config: AppConfig },
    Running(Viewer),
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let App::Pending { config } = self {
            let config = std::mem::take(config);
            *self = App::Running(Viewer::new(event_loop, config));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let App::Running(viewer) = self else {
            return;
        };

        viewer.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                viewer.resize(size);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = viewer.window.inner_size();
                viewer.resize(size);
            }
            WindowEvent::RedrawRequested => {
                viewer.frame();
                viewer.window.request_redraw();
            }
            _ => {}
        }
    }
}

/// Everything the viewer owns, created once at startup.
struct Viewer {
    window: Arc<Window>,
    gpu: GpuContext,
    camera: Camera,
    controls: OrbitControls,
    scene: Scene,
    shadow_pass: ShadowPass,
    mesh_pass: MeshPass,
    draw2d: Draw2d,
    panel: DebugPanel,
    input: Input,
    /// The one-shot background load; `None` once it resolved either way.
    pending_load: Option<ModelLoad>,
}

impl Viewer {
    fn new(event_loop: &ActiveEventLoop, config: AppConfig) -> Self {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs).unwrap());
        let gpu = GpuContext::new(window.clone());

        let mut camera = Camera::new()
            .at(Vec3::new(-0.003, 0.762, 3.0))
            .with_fov(75.0)
            .with_planes(0.1, 100.0);
        camera.set_aspect(gpu.width(), gpu.height());

        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.75, 0.0));
        controls.sync(&camera);

        let scene = Scene::new(&gpu);
        let shadow_pass = ShadowPass::new(&gpu, scene.sun.shadow.map_size);
        let mesh_pass = MeshPass::new(&gpu, &shadow_pass);

        let mut draw2d = Draw2d::new(&gpu);
        match FontAtlas::discover(&gpu, PANEL_FONT_SIZE) {
            Ok(atlas) => draw2d.attach_font(&gpu, atlas),
            Err(err) => log::warn!("panel text disabled: {err}"),
        }

        log::info!("loading model from {}", config.model_path.display());
        let pending_load = Some(ModelLoad::spawn(config.model_path));

        let mut viewer = Self {
            window,
            gpu,
            camera,
            controls,
            scene,
            shadow_pass,
            mesh_pass,
            draw2d,
            panel: DebugPanel::new(),
            input: Input::new(),
            pending_load,
        };

        // Apply the pixel-ratio cap to the initial surface too.
        let size = viewer.window.inner_size();
        viewer.resize(size);
        viewer.window.request_redraw();
        viewer
    }

    /// Reconfigure the surface for a new window size, with pixel density
    /// capped at 2x, and keep the camera's aspect ratio in step.
    fn resize(&mut self, size: PhysicalSize<u32>) {
        let scale = self.window.scale_factor();
        let capped = scale.min(MAX_PIXEL_RATIO);
        let width = (size.width as f64 / scale * capped).round() as u32;
        let height = (size.height as f64 / scale * capped).round() as u32;

        self.gpu.resize(width, height);
        self.camera.set_aspect(self.gpu.width(), self.gpu.height());
        self.mesh_pass.ensure_depth_size(&self.gpu);
    }

    /// One tick: poll the load, run input, record all three passes.
    fn frame(&mut self) {
        if let Some(load) = self.pending_load.take() {
            match load.poll() {
                Some(Ok(primitives)) => {
                    log::info!("model loaded: {} primitives", primitives.len());
                    self.scene
                        .attach_model(LoadedModel::upload(&self.gpu, primitives));
                }
                Some(Err(err)) => {
                    log::warn!("model load failed, continuing without it: {err}");
                }
                None => self.pending_load = Some(load),
            }
        }

        let viewport = Vec2::new(self.gpu.width() as f32, self.gpu.height() as f32);

        // Panel first: it owns the pointer while hovered, and a preset
        // click teleports the camera before the controls see any input.
        if let Some(preset) = self
            .panel
            .update(&self.input, &mut self.camera, viewport)
        {
            log::info!("view preset: {}", preset.label());
            preset.apply(&mut self.camera, &mut self.controls);
        }

        self.controls
            .process(&self.input, &mut self.camera, self.panel.captures());

        log::debug!(
            "camera position ({:.3}, {:.3}, {:.3}) rotation ({:.3}, {:.3}, {:.3})",
            self.camera.position.x,
            self.camera.position.y,
            self.camera.position.z,
            self.camera.rotation.x,
            self.camera.rotation.y,
            self.camera.rotation.z,
        );

        self.draw2d.clear();
        self.panel.draw(&mut self.draw2d, &self.camera, viewport);

        // Floor plus every model primitive; the floor only receives.
        let mut draws = vec![DrawCall {
            mesh: &self.scene.floor,
            matrix: self.scene.floor_transform.matrix(),
            color: FLOOR_COLOR,
            casts_shadow: false,
        }];
        if let Some(model) = &self.scene.model {
            let matrix = self.scene.model_transform.matrix();
            for primitive in &model.primitives {
                draws.push(DrawCall {
                    mesh: &primitive.mesh,
                    matrix,
                    color: primitive.base_color,
                    casts_shadow: true,
                });
            }
        }

        self.shadow_pass
            .prepare(&self.gpu, self.scene.sun.view_proj(), &draws);
        self.mesh_pass.prepare(
            &self.gpu,
            &self.camera,
            LightingInfo {
                ambient: &self.scene.ambient,
                sun: &self.scene.sun,
            },
            &draws,
        );

        let output = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu
                    .surface
                    .configure(&self.gpu.device, &self.gpu.config);
                return;
            }
            Err(err) => {
                log::warn!("surface acquire failed: {err}");
                return;
            }
        };
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.shadow_pass.render(&mut encoder, &draws);
        self.mesh_pass
            .render(&mut encoder, &target, CLEAR_COLOR, &draws);

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.draw2d.render(&self.gpu, &mut pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.input.begin_frame();
    }
}
