//! Directional-light shadow map pass.
//!
//! Renders shadow casters into a square depth texture from the light's
//! orthographic frustum. The main mesh pass samples the result through a
//! comparison sampler with a 3×3 PCF kernel.

use glam::Mat4;

use crate::gpu::GpuContext;
use crate::mesh::Vertex3d;
use crate::mesh_pass::{DrawCall, OBJECT_STRIDE};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct LightUniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CasterUniforms {
    model: [[f32; 4]; 4],
}

/// Depth-only render pass from the light's point of view.
pub struct ShadowPass {
    pipeline: wgpu::RenderPipeline,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_bind_group_layout: wgpu::BindGroupLayout,
    object_capacity: u32,
    /// The shadow map the mesh pass samples.
    pub view: wgpu::TextureView,
    /// Comparison sampler for PCF lookups.
    pub sampler: wgpu::Sampler,
    map_size: u32,
}

impl ShadowPass {
    pub fn new(gpu: &GpuContext, map_size: u32) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shadow.wgsl").into()),
        });

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Light Uniforms"),
            size: std::mem::size_of::<LightUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let light_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Light Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Light Bind Group"),
            layout: &light_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
        });

        let object_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Object Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<CasterUniforms>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let object_capacity = 64;
        let (object_buffer, object_bind_group) =
            Self::create_object_buffer(gpu, &object_bind_group_layout, object_capacity);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&light_bind_group_layout, &object_bind_group_layout],
            push_constant_ranges: &[],
        });

        // Depth-only: no fragment stage, constant + slope bias against acne.
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: map_size,
                height: map_size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Comparison Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            pipeline,
            light_buffer,
            light_bind_group,
            object_buffer,
            object_bind_group,
            object_bind_group_layout,
            object_capacity,
            view,
            sampler,
            map_size,
        }
    }

    fn create_object_buffer(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        capacity: u32,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Object Uniforms"),
            size: capacity as u64 * OBJECT_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Object Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<CasterUniforms>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    /// Shadow map resolution in texels.
    pub fn map_size(&self) -> u32 {
        self.map_size
    }

    /// Upload the light matrix and per-caster model matrices.
    pub fn prepare(&mut self, gpu: &GpuContext, light_view_proj: Mat4, draws: &[DrawCall]) {
        gpu.queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::cast_slice(&[LightUniforms {
                view_proj: light_view_proj.to_cols_array_2d(),
            }]),
        );

        if draws.len() as u32 > self.object_capacity {
            self.object_capacity = (draws.len() as u32).next_power_of_two();
            let (buffer, bind_group) =
                Self::create_object_buffer(gpu, &self.object_bind_group_layout, self.object_capacity);
            self.object_buffer = buffer;
            self.object_bind_group = bind_group;
        }

        for (i, call) in draws.iter().enumerate() {
            let uniforms = CasterUniforms {
                model: call.matrix.to_cols_array_2d(),
            };
            gpu.queue.write_buffer(
                &self.object_buffer,
                i as u64 * OBJECT_STRIDE,
                bytemuck::cast_slice(&[uniforms]),
            );
        }
    }

    /// Record the depth-only pass. Non-casters keep their slot but are
    /// skipped here.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, draws: &[DrawCall]) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.light_bind_group, &[]);

        for (i, call) in draws.iter().enumerate() {
            if !call.casts_shadow {
                continue;
            }
            let offset = (i as u64 * OBJECT_STRIDE) as u32;
            pass.set_bind_group(1, &self.object_bind_group, &[offset]);
            pass.set_vertex_buffer(0, call.mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(call.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..call.mesh.index_count, 0, 0..1);
        }
    }
}
