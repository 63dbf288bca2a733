//! Skybox pass: a unit cube around the camera sampling two cubemaps.
//!
//! The global cubemap is bound at slot 0 and the zone-local one at slot 1;
//! the fragment shader mixes them by the blend factor. Vertices are pushed
//! to the far plane (`xyww`) and depth writes are off, so world geometry
//! always draws over the sky.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use nebula_viewport::FrameMatrices;
use nebula_viewport::skybox::{CUBE_INDICES, CUBE_POSITIONS};
use wgpu::util::DeviceExt;

use crate::cubemap::GpuCubemap;
use crate::depth::DepthBuffer;

/// Per-draw skybox uniform.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SkyboxUniform {
    /// Projection times rotation-only view.
    pub view_proj: [[f32; 4]; 4],
    /// `x` is the global-to-local blend factor.
    pub blend: [f32; 4],
}

impl SkyboxUniform {
    pub fn new(matrices: &FrameMatrices, blend: f32) -> Self {
        Self {
            view_proj: skybox_view_projection(matrices).to_cols_array_2d(),
            blend: [blend.clamp(0.0, 1.0), 0.0, 0.0, 0.0],
        }
    }
}

/// View-projection with the camera translation removed.
pub fn skybox_view_projection(matrices: &FrameMatrices) -> Mat4 {
    matrices.projection * Mat4::from_mat3(Mat3::from_mat4(matrices.view))
}

/// WGSL shader source for the skybox pass.
pub const SKYBOX_SHADER_SOURCE: &str = r#"
struct SkyboxUniform {
    view_proj: mat4x4<f32>,
    blend: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> sky: SkyboxUniform;

@group(1) @binding(0)
var global_cube: texture_cube<f32>;
@group(1) @binding(1)
var local_cube: texture_cube<f32>;
@group(1) @binding(2)
var cube_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_skybox(@location(0) position: vec3<f32>) -> VertexOutput {
    let clip = sky.view_proj * vec4<f32>(position, 1.0);
    var out: VertexOutput;
    // z = w lands every vertex on the far plane.
    out.position = clip.xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_skybox(in: VertexOutput) -> @location(0) vec4<f32> {
    let global_color = textureSample(global_cube, cube_sampler, in.direction);
    let local_color = textureSample(local_cube, cube_sampler, in.direction);
    return vec4<f32>(mix(global_color.rgb, local_color.rgb, sky.blend.x), 1.0);
}
"#;

/// Bind groups for one skybox draw.
pub struct PreparedSkybox {
    uniform_bind_group: wgpu::BindGroup,
    cubemap_bind_group: wgpu::BindGroup,
}

/// Pipeline and cube geometry for the skybox pass.
pub struct SkyboxPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_bgl: wgpu::BindGroupLayout,
    cubemap_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

impl SkyboxPipeline {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skybox-shader"),
            source: wgpu::ShaderSource::Wgsl(SKYBOX_SHADER_SOURCE.into()),
        });

        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<SkyboxUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let cube_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::Cube,
                multisampled: false,
            },
            count: None,
        };
        let cubemap_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox-cubemap-bgl"),
            entries: &[
                cube_entry(0),
                cube_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox-pipeline-layout"),
            bind_group_layouts: &[&uniform_bgl, &cubemap_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skybox-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_skybox"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Seen from inside.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::stencil_state(
                false,
                DepthBuffer::COMPARE_FUNCTION,
            )),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_skybox"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("skybox-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox-cube-vertices"),
            contents: bytemuck::cast_slice(&CUBE_POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox-cube-indices"),
            contents: bytemuck::cast_slice(&CUBE_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            pipeline,
            uniform_bgl,
            cubemap_bgl,
            sampler,
            vertex_buffer,
            index_buffer,
        }
    }

    /// Build the bind groups for drawing `global` blended toward `local`.
    pub fn prepare(
        &self,
        device: &wgpu::Device,
        global: &GpuCubemap,
        local: &GpuCubemap,
        blend: f32,
        matrices: &FrameMatrices,
    ) -> PreparedSkybox {
        let uniform = SkyboxUniform::new(matrices, blend);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox-uniform"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox-uniform-bg"),
            layout: &self.uniform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let cubemap_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox-cubemap-bg"),
            layout: &self.cubemap_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&global.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&local.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        PreparedSkybox {
            uniform_bind_group,
            cubemap_bind_group,
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, prepared: &PreparedSkybox) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &prepared.uniform_bind_group, &[]);
        pass.set_bind_group(1, &prepared.cubemap_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..CUBE_INDICES.len() as u32, 0, 0..1);
    }
}
